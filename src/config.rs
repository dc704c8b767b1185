//! Export configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ExportError, Result};
use crate::profile::{resolve_profile, StyleProfile, SINGLE_COLUMN};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8888/.netlify/functions/generate-pdf";
pub const DEFAULT_PREVIEW_ID: &str = "resume-preview";
pub const DEFAULT_FILENAME: &str = "resume.pdf";

/// Everything one export needs besides the page itself.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// URL of the rendering service.
    pub endpoint: String,
    /// `id` of the live preview element.
    pub preview_id: String,
    /// Built-in style profile name.
    pub profile: String,
    /// Accent colour replacing the profile's primary colour.
    pub theme_color: Option<String>,
    /// Partial profile, deep-merged over the named one.
    pub overrides: Option<Value>,
    /// Requested download name; the service may suggest another.
    pub filename: String,
    /// Directory the PDF is written into.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            preview_id: DEFAULT_PREVIEW_ID.to_string(),
            profile: SINGLE_COLUMN.to_string(),
            theme_color: None,
            overrides: None,
            filename: DEFAULT_FILENAME.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    /// The named profile with any overrides applied.
    pub fn style_profile(&self) -> Result<StyleProfile> {
        let profile = resolve_profile(&self.profile);
        match &self.overrides {
            Some(overrides) => profile.apply_overrides(overrides),
            None => Ok(profile),
        }
    }
}

/// Read a JSON profile override document.
pub fn load_overrides(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        ExportError::Config(format!("invalid overrides file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_local_service() {
        let config = ExportConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.preview_id, "resume-preview");
        assert_eq!(config.profile, "single-column");
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn overrides_are_applied_to_named_profile() {
        let config = ExportConfig {
            profile: "two-column".to_string(),
            overrides: Some(json!({ "colors": { "primary": "#0f766e" } })),
            ..ExportConfig::default()
        };
        let profile = config.style_profile().unwrap();
        assert_eq!(profile.name, "two-column");
        assert_eq!(profile.colors.primary, "#0f766e");
    }

    #[test]
    fn non_object_overrides_are_rejected() {
        let config = ExportConfig {
            overrides: Some(json!(["not", "an", "object"])),
            ..ExportConfig::default()
        };
        assert!(matches!(config.style_profile(), Err(ExportError::Config(_))));
    }

    #[test]
    fn overrides_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ nope").unwrap();
        assert!(matches!(load_overrides(&bad), Err(ExportError::Config(_))));
        assert!(matches!(
            load_overrides(&dir.path().join("missing.json")),
            Err(ExportError::Io(_))
        ));
    }
}
