//! Export client – prepares the document, has it rendered and writes the
//! resulting PDF into the download directory.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::{ExportConfig, DEFAULT_FILENAME};
use crate::dom::Node;
use crate::error::Result;
use crate::pipeline::{prepare_page, PreparedDocument};
use crate::service::{interpret_reply, HttpRenderService, RenderRequest, RenderService};
use crate::snapshot::StyleSnapshot;

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub document: PreparedDocument,
}

/// Runs one export per call; calls share nothing but the service handle.
pub struct ExportClient {
    service: Box<dyn RenderService>,
    config: ExportConfig,
}

impl ExportClient {
    /// Client talking HTTP to `config.endpoint`.
    pub fn new(config: ExportConfig) -> Result<Self> {
        let service = HttpRenderService::new(config.endpoint.clone())?;
        Ok(Self::with_service(config, Box::new(service)))
    }

    pub fn with_service(config: ExportConfig, service: Box<dyn RenderService>) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the preview found in `page`.
    pub async fn export(
        &self,
        page: &[Node],
        snapshot: &dyn StyleSnapshot,
    ) -> Result<ExportOutcome> {
        let document = prepare_page(page, &self.config, snapshot)?;
        let requested = download_name(&self.config.filename);

        info!(
            "Submitting {} bytes to {} as {requested}",
            document.html.len(),
            self.service.endpoint()
        );
        let request = RenderRequest {
            html: document.html.clone(),
            filename: requested.clone(),
        };
        let reply = self.service.render(&request).await?;
        let pdf = interpret_reply(self.service.endpoint(), &reply)?;

        let name = pdf
            .filename
            .as_deref()
            .map(download_name)
            .unwrap_or(requested);
        fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(&name);
        fs::write(&path, &pdf.bytes)?;
        info!("Wrote {} ({} bytes)", path.display(), pdf.bytes.len());

        Ok(ExportOutcome {
            path,
            bytes_written: pdf.bytes.len(),
            document,
        })
    }
}

/// Reduce a suggested filename to a safe leaf name ending in `.pdf`.
pub fn download_name(suggested: &str) -> String {
    let leaf = suggested.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = leaf.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        warn!("Unusable download name {suggested:?}, using {DEFAULT_FILENAME}");
        return DEFAULT_FILENAME.to_string();
    }
    if cleaned.to_ascii_lowercase().ends_with(".pdf") {
        cleaned.to_string()
    } else {
        format!("{cleaned}.pdf")
    }
}

impl std::fmt::Debug for ExportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportClient")
            .field("endpoint", &self.service.endpoint())
            .field("config", &self.config)
            .finish()
    }
}

/// Convenience: one export over HTTP with `config`.
pub async fn export_to_pdf(
    page: &[Node],
    snapshot: &dyn StyleSnapshot,
    config: ExportConfig,
) -> Result<ExportOutcome> {
    ExportClient::new(config)?.export(page, snapshot).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::error::ExportError;
    use crate::service::RawReply;
    use crate::snapshot::FixedStyles;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::sync::Mutex;

    /// Replays a canned reply and keeps the last request.
    struct Canned {
        reply: RawReply,
        seen: Mutex<Option<RenderRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: String) -> Self {
            Self {
                reply: RawReply { status, body },
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RenderService for Canned {
        fn endpoint(&self) -> &str {
            "memory://render"
        }

        async fn render(&self, request: &RenderRequest) -> Result<RawReply> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn page() -> Vec<Node> {
        parse_html(r#"<div id="resume-preview"><div class="bg-white"><h1>Jane</h1></div></div>"#)
    }

    fn success(filename: Option<&str>) -> String {
        let data = STANDARD.encode(b"%PDF-1.7\n%fake");
        match filename {
            Some(f) => format!(r#"{{"success":true,"data":"{data}","filename":"{f}"}}"#),
            None => format!(r#"{{"success":true,"data":"{data}"}}"#),
        }
    }

    fn config(dir: &std::path::Path) -> ExportConfig {
        ExportConfig {
            output_dir: dir.to_path_buf(),
            filename: "Jane Doe Resume".to_string(),
            ..ExportConfig::default()
        }
    }

    #[test]
    fn download_names_are_leaf_pdf_names() {
        assert_eq!(download_name("resume.pdf"), "resume.pdf");
        assert_eq!(download_name("Jane Doe"), "Jane Doe.pdf");
        assert_eq!(download_name("../../etc/passwd"), "passwd.pdf");
        assert_eq!(download_name("C:\\tmp\\cv.PDF"), "cv.PDF");
        assert_eq!(download_name("a\u{7}b\n.pdf"), "ab.pdf");
        assert_eq!(download_name("..."), "resume.pdf");
        assert_eq!(download_name(""), "resume.pdf");
    }

    #[tokio::test]
    async fn writes_caller_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let client = ExportClient::with_service(
            config(dir.path()),
            Box::new(Canned::new(200, success(None))),
        );
        let outcome = client.export(&page(), &FixedStyles::default()).await.unwrap();
        assert_eq!(outcome.path, dir.path().join("Jane Doe Resume.pdf"));
        assert!(outcome.bytes_written > 0);
        assert_eq!(fs::read(&outcome.path).unwrap(), b"%PDF-1.7\n%fake");
    }

    #[tokio::test]
    async fn service_filename_wins() {
        let dir = tempfile::tempdir().unwrap();
        let canned = Canned::new(200, success(Some("server-name.pdf")));
        let client = ExportClient::with_service(config(dir.path()), Box::new(canned));
        let outcome = client.export(&page(), &FixedStyles::default()).await.unwrap();
        assert_eq!(outcome.path, dir.path().join("server-name.pdf"));
    }

    #[tokio::test]
    async fn request_carries_document_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let canned = std::sync::Arc::new(Canned::new(200, success(None)));

        struct Shared(std::sync::Arc<Canned>);

        #[async_trait]
        impl RenderService for Shared {
            fn endpoint(&self) -> &str {
                self.0.endpoint()
            }
            async fn render(&self, request: &RenderRequest) -> Result<RawReply> {
                self.0.render(request).await
            }
        }

        let client =
            ExportClient::with_service(config(dir.path()), Box::new(Shared(canned.clone())));
        client.export(&page(), &FixedStyles::new(".live{}")).await.unwrap();
        let seen = canned.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.filename, "Jane Doe Resume.pdf");
        assert!(seen.html.contains("<h1>Jane</h1>"));
        assert!(seen.html.contains(".live{}"));
    }

    #[tokio::test]
    async fn not_found_reply_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = ExportClient::with_service(
            config(dir.path()),
            Box::new(Canned::new(404, "Not Found".to_string())),
        );
        let err = client.export(&page(), &FixedStyles::default()).await.unwrap_err();
        assert!(err.is_service_unavailable());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_preview_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let client = ExportClient::with_service(
            config(dir.path()),
            Box::new(Canned::new(500, String::new())),
        );
        let err = client
            .export(&parse_html("<div></div>"), &FixedStyles::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::PreviewNotFound(_)));
    }
}
