use serde::{Deserialize, Serialize};

use crate::error::{DocError, DocResult};

/// Configuration for a [`PdfDocument`](crate::PdfDocument).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Allow the writer to pack eligible objects into object streams.
    pub use_object_streams: bool,
    /// Read every object from the source when the document is opened.
    /// When off, objects are read on first mutable access.
    pub preload_objects: bool,
    /// Incremental update: closing writes only objects marked modified.
    pub append_mode: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            use_object_streams: true,
            preload_objects: true,
            append_mode: false,
        }
    }
}

impl DocumentConfig {
    /// Settings for appending an incremental update to an existing file.
    pub fn incremental() -> Self {
        Self {
            append_mode: true,
            ..Default::default()
        }
    }

    /// Parse from TOML. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> DocResult<Self> {
        toml::from_str(source).map_err(|e| DocError::Config(e.to_string()))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> DocResult<String> {
        toml::to_string(self).map_err(|e| DocError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DocumentConfig::default();
        assert!(config.use_object_streams);
        assert!(config.preload_objects);
        assert!(!config.append_mode);
        assert!(DocumentConfig::incremental().append_mode);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = DocumentConfig::from_toml_str("append_mode = true\n").unwrap();
        assert!(config.append_mode);
        assert!(config.use_object_streams);
    }

    #[test]
    fn toml_roundtrip() {
        let config = DocumentConfig {
            use_object_streams: false,
            preload_objects: false,
            append_mode: true,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(DocumentConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = DocumentConfig::from_toml_str("append_mode = \"yes\"").unwrap_err();
        assert!(matches!(err, DocError::Config(_)));
    }
}
