use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_text_length: usize,
    pub step_name_max_length: usize,
    pub script_name_min_length: usize,
    pub script_name_max_length: usize,
    pub timeout_min_seconds: f64,
    pub timeout_max_seconds: f64,
    pub max_retry_count: u32,
}

impl ValidationConfig {
    pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_text_length: Self::DEFAULT_MAX_TEXT_LENGTH,
            step_name_max_length: 100,
            script_name_min_length: 2,
            script_name_max_length: 100,
            timeout_min_seconds: 0.1,
            timeout_max_seconds: 3600.0,
            max_retry_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepforgeConfig {
    pub validation: ValidationConfig,
    pub editor: EditorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let config: StepforgeConfig =
            serde_json::from_str(r#"{"validation": {"max_retry_count": 3}}"#).expect("config");
        assert_eq!(config.validation.max_retry_count, 3);
        assert_eq!(config.validation.script_name_min_length, 2);
        assert_eq!(config.editor.history_capacity, 50);
    }

    #[test]
    fn empty_document_is_default() {
        let config: StepforgeConfig = serde_json::from_str("{}").expect("config");
        assert_eq!(config, StepforgeConfig::default());
    }
}
