use serde::Serialize;
use serde_json::{Map, Value};

pub type Params = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Text,
    Number,
    Select,
    Checkbox,
    Radio,
    Textarea,
    Locator,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamFormat {
    Url,
    FilePath,
    Identifier,
    JsonPath,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: &'static str,
    pub value: Value,
}

impl SelectOption {
    pub fn new(label: &'static str, value: impl Into<Value>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

// A missing sibling compares as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VisibleWhen {
    Equals { field: &'static str, value: Value },
    NotEquals { field: &'static str, value: Value },
}

impl VisibleWhen {
    pub fn evaluate(&self, params: &Params) -> bool {
        match self {
            VisibleWhen::Equals { field, value } => {
                params.get(*field).unwrap_or(&Value::Null) == value
            }
            VisibleWhen::NotEquals { field, value } => {
                params.get(*field).unwrap_or(&Value::Null) != value
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub integer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ParamFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibleWhen>,
}

impl ParamSchema {
    pub fn new(name: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
            options: Vec::new(),
            min: None,
            max: None,
            integer: false,
            format: None,
            placeholder: None,
            description: None,
            visible_when: None,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamKind::Text)
    }

    pub fn textarea(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamKind::Textarea)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamKind::Number)
    }

    pub fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamKind::Checkbox)
    }

    pub fn locator(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamKind::Locator)
    }

    pub fn json(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamKind::Json)
    }

    pub fn select(name: &'static str, label: &'static str, options: Vec<SelectOption>) -> Self {
        let mut schema = Self::new(name, label, ParamKind::Select);
        schema.options = options;
        schema
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn format(mut self, format: ParamFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn visible_when(mut self, predicate: VisibleWhen) -> Self {
        self.visible_when = Some(predicate);
        self
    }

    pub fn is_visible(&self, params: &Params) -> bool {
        self.visible_when
            .as_ref()
            .map_or(true, |predicate| predicate.evaluate(params))
    }

    pub fn allows_option(&self, value: &Value) -> bool {
        self.options.is_empty() || self.options.iter().any(|option| &option.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn visibility_follows_sibling_value() {
        let schema = ParamSchema::number("x", "X").visible_when(VisibleWhen::Equals {
            field: "scroll_type",
            value: json!("custom"),
        });
        assert!(schema.is_visible(&params(json!({"scroll_type": "custom"}))));
        assert!(!schema.is_visible(&params(json!({"scroll_type": "top"}))));
        assert!(!schema.is_visible(&Params::new()));
    }

    #[test]
    fn not_equals_treats_missing_as_null() {
        let schema = ParamSchema::locator("locator", "Locator").visible_when(VisibleWhen::NotEquals {
            field: "source",
            value: json!("text"),
        });
        assert!(schema.is_visible(&Params::new()));
        assert!(!schema.is_visible(&params(json!({"source": "text"}))));
    }

    #[test]
    fn options_restrict_values_only_when_declared() {
        let free = ParamSchema::text("key", "Key");
        assert!(free.allows_option(&json!("anything")));

        let select = ParamSchema::select(
            "orientation",
            "Orientation",
            vec![
                SelectOption::new("Portrait", "portrait"),
                SelectOption::new("Landscape", "landscape"),
            ],
        );
        assert!(select.allows_option(&json!("landscape")));
        assert!(!select.allows_option(&json!("upside_down")));
    }

    #[test]
    fn schema_export_skips_unset_fields() {
        let schema = ParamSchema::text("url", "URL").required().format(ParamFormat::Url);
        let exported = serde_json::to_value(&schema).unwrap();
        assert_eq!(exported["required"], true);
        assert_eq!(exported["format"], "url");
        assert!(exported.get("options").is_none());
        assert!(exported.get("visible_when").is_none());
    }
}
