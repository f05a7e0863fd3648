//! Editor configuration

use serde::Deserialize;

use crate::error::Result;

/// Tunables for an editor instance.
///
/// Every field has a default, so a partial JSON object such as
/// `{"debounceMs": 250}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period before typed text is re-wrapped into word spans
    pub debounce_ms: u32,
    /// Class marking the selected word span
    pub selected_class: String,
    /// Attribute on toolbar controls naming the format they toggle
    pub format_attribute: String,
    /// Move the caret to the end of the last word after a re-wrap
    pub caret_to_end: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            selected_class: "selected".to_string(),
            format_attribute: "data-formatType".to_string(),
            caret_to_end: true,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.debounce_ms, 100);
        assert_eq!(config.selected_class, "selected");
        assert_eq!(config.format_attribute, "data-formatType");
        assert!(config.caret_to_end);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"debounceMs": 250}"#).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.selected_class, "selected");
    }

    #[test]
    fn test_invalid_json() {
        assert!(EditorConfig::from_json("{debounceMs:").is_err());
    }
}
