// User-facing status labels
//
// One catalog per process. It starts out as the built-in English text and
// may be replaced once, at startup, from a YAML file.

use crate::error::KmodError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

static CATALOG: OnceLock<Messages> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub module_header: String,
    pub name_label: String,
    pub loaded_label: String,
    pub version_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            module_header: "Kernel module:".to_string(),
            name_label: "  Name: ".to_string(),
            loaded_label: "  Loaded: ".to_string(),
            version_label: "  Version information: ".to_string(),
        }
    }
}

impl Messages {
    /// Read a catalog from a YAML file; absent keys keep their English text
    pub fn load(path: &Path) -> Result<Self, KmodError> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| KmodError::Messages(format!("{}: {}", path.display(), e)))
    }
}

/// The process-wide catalog, initialised to defaults on first use
pub fn global() -> &'static Messages {
    CATALOG.get_or_init(Messages::default)
}

/// Replace the catalog. Only possible before anything has read it.
pub fn install(messages: Messages) -> Result<(), KmodError> {
    CATALOG
        .set(messages)
        .map_err(|_| KmodError::Messages("message catalog already initialised".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_labels() {
        let messages = Messages::default();
        assert_eq!(messages.module_header, "Kernel module:");
        assert_eq!(messages.name_label, "  Name: ");
        assert_eq!(messages.loaded_label, "  Loaded: ");
        assert_eq!(messages.version_label, "  Version information: ");
    }

    #[test]
    fn test_load_partial_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "module_header: \"Module noyau :\"").unwrap();
        writeln!(file, "loaded_label: \"  Chargé : \"").unwrap();

        let messages = Messages::load(file.path()).unwrap();
        assert_eq!(messages.module_header, "Module noyau :");
        assert_eq!(messages.loaded_label, "  Chargé : ");
        // untouched keys fall back
        assert_eq!(messages.name_label, "  Name: ");
    }

    #[test]
    fn test_load_rejects_malformed_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "module_header: [unterminated").unwrap();
        let err = Messages::load(file.path()).unwrap_err();
        assert!(matches!(err, KmodError::Messages(_)));
    }

    #[test]
    fn test_install_after_use_fails() {
        let _ = global();
        assert!(install(Messages::default()).is_err());
    }
}
