//! Rendering service boundary – submits the assembled document to the
//! external headless-browser service and interprets its reply.
//!
//! Wire format: the request is `{ "html": ..., "filename": ... }`; a
//! successful reply is `{ "success": true, "data": <base64 PDF>,
//! "filename"?: ... }`, a failed one carries `error` and/or `details`.
//! HTTP 404 means the service is not deployed where we looked.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Longest slice of an unparseable reply body quoted in an error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Request body sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRequest {
    pub html: String,
    pub filename: String,
}

/// Status and body of a service reply, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

/// Decoded PDF plus the filename the service suggested, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceReply {
    success: Option<bool>,
    data: Option<String>,
    filename: Option<String>,
    error: Option<String>,
    details: Option<String>,
}

impl ServiceReply {
    fn detail(&self) -> Option<String> {
        let error = self.error.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let details = self.details.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (error, details) {
            (Some(e), Some(d)) if e != d => Some(format!("{e} ({d})")),
            (Some(e), _) => Some(e.to_string()),
            (None, Some(d)) => Some(d.to_string()),
            (None, None) => None,
        }
    }
}

/// The external HTML-to-PDF renderer.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Where requests go, for error messages.
    fn endpoint(&self) -> &str;

    /// Submit a document. Transport failures map to
    /// [`ExportError::ServiceUnavailable`]; any HTTP reply is returned as is.
    async fn render(&self, request: &RenderRequest) -> Result<RawReply>;
}

/// JSON-over-HTTP client for the rendering service.
#[derive(Debug, Clone)]
pub struct HttpRenderService {
    client: Client,
    endpoint: String,
}

impl HttpRenderService {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ExportError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RenderService for HttpRenderService {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn render(&self, request: &RenderRequest) -> Result<RawReply> {
        debug!(
            "POST {} ({} bytes of HTML, filename {})",
            self.endpoint,
            request.html.len(),
            request.filename
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ExportError::ServiceUnavailable {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExportError::DecodeFailed(format!("cannot read reply body: {e}")))?;
        Ok(RawReply { status, body })
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{cut}...")
}

/// Turn a raw reply into PDF bytes or a typed failure.
pub fn interpret_reply(endpoint: &str, reply: &RawReply) -> Result<RenderedPdf> {
    if reply.status == 404 {
        return Err(ExportError::ServiceUnavailable {
            endpoint: endpoint.to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        });
    }

    let ok_status = (200..300).contains(&reply.status);
    let parsed = serde_json::from_str::<ServiceReply>(&reply.body);

    let parsed = match (ok_status, parsed) {
        (true, Ok(p)) if p.success == Some(true) => p,
        (true, Ok(p)) => {
            return Err(ExportError::GenerationFailed(
                p.detail()
                    .unwrap_or_else(|| "PDF generation failed".to_string()),
            ))
        }
        (true, Err(e)) => {
            return Err(ExportError::DecodeFailed(format!(
                "reply is not valid JSON ({e}): {}",
                excerpt(&reply.body)
            )))
        }
        (false, parsed) => {
            let detail = parsed.ok().and_then(|p| p.detail()).unwrap_or_else(|| {
                format!("HTTP {}: {}", reply.status, excerpt(&reply.body))
            });
            return Err(ExportError::GenerationFailed(detail));
        }
    };

    let data = parsed
        .data
        .as_deref()
        .ok_or_else(|| ExportError::DecodeFailed("reply has no data field".to_string()))?;
    let clean: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(clean.as_bytes())
        .map_err(|e| ExportError::DecodeFailed(format!("invalid base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(ExportError::DecodeFailed("empty PDF payload".to_string()));
    }
    if !bytes.starts_with(b"%PDF") {
        warn!("Rendered payload does not start with a PDF header");
    }

    Ok(RenderedPdf {
        bytes,
        filename: parsed.filename.filter(|f| !f.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "http://localhost:8888/.netlify/functions/generate-pdf";

    fn reply(status: u16, body: &str) -> RawReply {
        RawReply {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn not_found_is_service_unavailable() {
        let err = interpret_reply(ENDPOINT, &reply(404, "<html>Not Found</html>")).unwrap_err();
        assert!(err.is_service_unavailable());
        let err = interpret_reply(ENDPOINT, &reply(404, r#"{"success":false,"error":"x"}"#))
            .unwrap_err();
        assert!(err.is_service_unavailable());
    }

    #[test]
    fn success_decodes_payload() {
        let data = STANDARD.encode(b"%PDF-1.7 test");
        let body = format!(r#"{{"success":true,"data":"{}","filename":"jane.pdf"}}"#, data);
        let pdf = interpret_reply(ENDPOINT, &reply(200, &body)).unwrap();
        assert_eq!(pdf.bytes, b"%PDF-1.7 test");
        assert_eq!(pdf.filename.as_deref(), Some("jane.pdf"));
    }

    #[test]
    fn whitespace_in_base64_is_ignored() {
        let data = STANDARD.encode(b"%PDF-1.4 with line breaks");
        let (a, b) = data.split_at(8);
        let body = format!(r#"{{"success":true,"data":"{a}\n \r{b}"}}"#);
        let pdf = interpret_reply(ENDPOINT, &reply(200, &body)).unwrap();
        assert_eq!(pdf.bytes, b"%PDF-1.4 with line breaks");
        assert_eq!(pdf.filename, None);
    }

    #[test]
    fn service_error_detail_is_surfaced() {
        let err = interpret_reply(
            ENDPOINT,
            &reply(500, r#"{"error":"Chromium crashed","details":"out of memory"}"#),
        )
        .unwrap_err();
        match err {
            ExportError::GenerationFailed(msg) => {
                assert_eq!(msg, "Chromium crashed (out of memory)")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn success_false_is_generation_failure() {
        let err = interpret_reply(ENDPOINT, &reply(200, r#"{"success":false,"details":"bad html"}"#))
            .unwrap_err();
        assert!(matches!(err, ExportError::GenerationFailed(ref m) if m == "bad html"));
        let err = interpret_reply(ENDPOINT, &reply(200, r#"{"success":false}"#)).unwrap_err();
        assert!(matches!(err, ExportError::GenerationFailed(ref m) if m == "PDF generation failed"));
    }

    #[test]
    fn non_json_error_reply_quotes_status() {
        let err = interpret_reply(ENDPOINT, &reply(502, "Bad Gateway")).unwrap_err();
        assert!(matches!(err, ExportError::GenerationFailed(ref m) if m == "HTTP 502: Bad Gateway"));
    }

    #[test]
    fn undecodable_payloads_are_decode_failures() {
        for body in [
            "not json",
            r#"{"success":true}"#,
            r#"{"success":true,"data":"***"}"#,
            r#"{"success":true,"data":""}"#,
        ] {
            let err = interpret_reply(ENDPOINT, &reply(200, body)).unwrap_err();
            assert!(matches!(err, ExportError::DecodeFailed(_)), "{body}: {err:?}");
        }
    }
}
