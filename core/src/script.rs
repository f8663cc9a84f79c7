use crate::catalog::StepCatalog;
use crate::config::ValidationConfig;
use crate::locator::RawLocator;
use crate::param::{ParamFormat, ParamKind, ParamSchema, Params};
use crate::platform::{Framework, Platform};
use crate::step::TestStep;
use crate::tree::{rejected, StepTree, TreeError};
use crate::validation::{
    scalar_text, validate_assertion, validate_file_path, validate_json_field, validate_number,
    validate_raw_locator, validate_script_name_with, validate_step_name_with, validate_text,
    validate_timeout_with, validate_url, validate_variable_name, AssertionKind, BatchValidation,
    NumberRules, TextRules, ValidationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid script document: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize script: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(alias = "type")]
    pub platform: Platform,
    pub framework: Framework,
    #[serde(default)]
    pub steps: StepTree,
    #[serde(default)]
    pub variables: Params,
    #[serde(default, alias = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_module: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<i64>,
    #[serde(default)]
    pub data_driven: bool,
}

impl Script {
    pub fn create_empty(platform: Platform, framework: Framework) -> Self {
        Self {
            id: None,
            project: None,
            name: String::new(),
            description: String::new(),
            platform,
            framework,
            steps: StepTree::new(),
            variables: Params::new(),
            timeout_seconds: None,
            retry_count: None,
            tags: Vec::new(),
            is_module: false,
            module_name: None,
            data_source: None,
            data_driven: false,
        }
    }

    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(input).map_err(DocumentError::Parse)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        serde_json::from_value(value).map_err(DocumentError::Parse)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    pub fn insert_step(
        &mut self,
        parent: Option<&str>,
        index: usize,
        step: TestStep,
    ) -> Result<(), TreeError> {
        let catalog = StepCatalog::global();
        let mut pending = vec![&step];
        while let Some(node) = pending.pop() {
            if !catalog.is_valid_kind(node.kind, self.platform) {
                return rejected(TreeError::UnsupportedKind {
                    id: node.id.clone(),
                    kind: node.kind,
                    platform: self.platform,
                });
            }
            pending.extend(node.children.iter());
        }
        self.steps.insert(parent, index, step)
    }

    pub fn push_step(&mut self, parent: Option<&str>, step: TestStep) -> Result<(), TreeError> {
        let index = match parent {
            None => self.steps.roots().len(),
            Some(parent_id) => self
                .steps
                .find(parent_id)
                .map_or(0, |parent| parent.children.len()),
        };
        self.insert_step(parent, index, step)
    }

    pub fn validate(&self) -> BatchValidation {
        self.validate_with(&ValidationConfig::default())
    }

    pub fn validate_with(&self, config: &ValidationConfig) -> BatchValidation {
        let mut ctx = ValidationContext::new(config);

        ctx.check("name", validate_script_name_with(&self.name, config));
        if !self.platform.supports(self.framework) {
            ctx.error_at(
                "framework",
                format!(
                    "framework '{}' is not available for platform '{}'",
                    self.framework, self.platform
                ),
            );
        }

        for key in self.variables.keys() {
            ctx.check(&format!("variables.{key}"), validate_variable_name(key));
        }

        if let Some(timeout) = self.timeout_seconds {
            ctx.check("timeout_seconds", validate_timeout_with(&Value::from(timeout), config));
        }

        if let Some(retry) = self.retry_count {
            let rules = NumberRules::new("retry_count")
                .integer()
                .min(0.0)
                .max(f64::from(config.max_retry_count));
            ctx.check("retry_count", validate_number(&Value::from(retry), &rules));
        }

        if self.is_module {
            let rules = TextRules::new("module name")
                .required()
                .max_length(config.script_name_max_length);
            let module_name = self.module_name.as_deref().unwrap_or_default();
            ctx.check("module_name", validate_text(module_name, &rules));
        }

        validate_steps(self.steps.roots(), self.platform, &mut ctx);

        let result = ctx.finish();
        tracing::debug!(
            script = %self.name,
            steps = self.steps.len(),
            errors = result.errors.len(),
            "script validated"
        );
        result
    }
}

pub fn validate_step(
    step: &TestStep,
    platform: Platform,
    config: &ValidationConfig,
) -> BatchValidation {
    let mut ctx = ValidationContext::new(config);
    validate_steps(std::slice::from_ref(step), platform, &mut ctx);
    ctx.finish()
}

struct ValidationContext<'a> {
    config: &'a ValidationConfig,
    stack: Vec<String>,
    seen_ids: HashMap<String, String>,
    errors: BTreeMap<String, String>,
}

impl<'a> ValidationContext<'a> {
    fn new(config: &'a ValidationConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            seen_ids: HashMap::new(),
            errors: BTreeMap::new(),
        }
    }

    fn push(&mut self, segment: impl Into<String>) {
        self.stack.push(segment.into());
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn location(&self) -> String {
        self.stack.join(".")
    }

    fn field(&self, segment: &str) -> String {
        if self.stack.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.location())
        }
    }

    // Records `message` under `segment` below the current location; the
    // first error reported for a field is kept.
    fn error_at(&mut self, segment: &str, message: impl Into<String>) {
        let field = self.field(segment);
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    fn check(&mut self, segment: &str, result: ValidationResult) {
        if !result.valid {
            let message = result.error.unwrap_or_else(|| "invalid value".to_string());
            self.error_at(segment, message);
        }
    }

    fn finish(self) -> BatchValidation {
        BatchValidation::from_errors(self.errors)
    }
}

fn validate_steps(steps: &[TestStep], platform: Platform, ctx: &mut ValidationContext<'_>) {
    for (index, step) in steps.iter().enumerate() {
        let segment = if ctx.stack.is_empty() {
            format!("steps[{index}]")
        } else {
            format!("children[{index}]")
        };
        ctx.push(segment);
        validate_single(step, platform, ctx);
        ctx.pop();
    }
}

fn validate_single(step: &TestStep, platform: Platform, ctx: &mut ValidationContext<'_>) {
    let location = ctx.location();
    match ctx.seen_ids.get(&step.id).cloned() {
        Some(first) => {
            let message = format!("duplicate step id '{}' (also used at {first})", step.id);
            ctx.error_at("id", message);
        }
        None => {
            ctx.seen_ids.insert(step.id.clone(), location);
        }
    }

    let config = ctx.config;
    ctx.check("name", validate_step_name_with(&step.name, config));

    if step.kind.is_flow_control() && step.children.is_empty() {
        ctx.error_at(
            "children",
            format!(
                "flow-control step '{}' must contain at least one child step",
                step.kind
            ),
        );
    } else if !step.kind.is_flow_control() && !step.children.is_empty() {
        ctx.error_at(
            "children",
            format!("step type '{}' cannot contain child steps", step.kind),
        );
    }

    match StepCatalog::global().definition(step.kind, platform) {
        Some(definition) => {
            ctx.push("params");
            for schema in &definition.param_schema {
                if schema.is_visible(&step.params) {
                    validate_param(schema, step.params.get(schema.name), ctx);
                }
            }
            ctx.pop();
            for key in step.params.keys().filter(|key| !definition.declares(key)) {
                tracing::trace!(step = %step.id, param = %key, "undeclared param tolerated");
            }
        }
        None => ctx.error_at(
            "type",
            format!(
                "step type '{}' is not available on platform '{platform}'",
                step.kind
            ),
        ),
    }

    validate_steps(&step.children, platform, ctx);
}

// A locator placeholder is `{}` or a strategy with an empty value.
fn is_blank(value: &Value, kind: ParamKind) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(_) if matches!(kind, ParamKind::Locator) => RawLocator::from_value(value)
            .map_or(false, |locator| {
                (locator.strategy.is_some() || locator.value.is_none()) && locator.is_blank()
            }),
        _ => false,
    }
}

fn validate_param(schema: &ParamSchema, value: Option<&Value>, ctx: &mut ValidationContext<'_>) {
    let name = schema.name;
    let Some(value) = value.filter(|value| !is_blank(value, schema.kind)) else {
        if schema.required {
            ctx.error_at(name, format!("{} is required", schema.label));
        }
        return;
    };

    let result = match schema.kind {
        ParamKind::Text | ParamKind::Textarea => match scalar_text(value) {
            Some(text) => validate_formatted_text(schema, value, &text, ctx.config),
            None => ValidationResult::invalid(name, format!("{name} must be text")),
        },
        ParamKind::Number => {
            let mut rules = NumberRules::new(name);
            rules.min = schema.min;
            rules.max = schema.max;
            rules.integer = schema.integer;
            validate_number(value, &rules)
        }
        ParamKind::Select | ParamKind::Radio => {
            if schema.allows_option(value) {
                ValidationResult::ok()
            } else {
                let allowed: Vec<String> = schema
                    .options
                    .iter()
                    .map(|option| scalar_text(&option.value).unwrap_or_default().into_owned())
                    .collect();
                ValidationResult::invalid(
                    name,
                    format!("{name} must be one of: {}", allowed.join(", ")),
                )
            }
        }
        ParamKind::Checkbox => {
            if value.is_boolean() {
                ValidationResult::ok()
            } else {
                ValidationResult::invalid(name, format!("{name} must be true or false"))
            }
        }
        ParamKind::Locator => match RawLocator::from_value(value) {
            Some(locator) => {
                let result = validate_raw_locator(&locator);
                if result.field.as_deref() == Some("locator.type") {
                    ctx.check(&format!("{name}.type"), result);
                } else {
                    ctx.check(&format!("{name}.value"), result);
                }
                return;
            }
            None => ValidationResult::invalid(
                name,
                format!("{name} must be an object with type and value"),
            ),
        },
        ParamKind::Json => match value {
            Value::String(text) => validate_json_field(text, name, schema.required),
            _ => ValidationResult::ok(),
        },
    };
    ctx.check(name, result);
}

fn validate_formatted_text(
    schema: &ParamSchema,
    value: &Value,
    text: &str,
    config: &ValidationConfig,
) -> ValidationResult {
    match schema.format {
        Some(ParamFormat::Url) => validate_url(text),
        Some(ParamFormat::FilePath) => validate_file_path(text),
        Some(ParamFormat::Identifier) => validate_variable_name(text),
        Some(ParamFormat::JsonPath) => validate_assertion(value, AssertionKind::Jsonpath),
        Some(ParamFormat::Json) => validate_json_field(text, schema.name, schema.required),
        None => {
            let rules = TextRules::new(schema.name).max_length(config.max_text_length);
            validate_text(text, &rules)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::StepType;
    use serde_json::json;

    fn web_script() -> Script {
        let mut script = Script::create_empty(Platform::Web, Framework::Selenium);
        script.name = "Login flow".to_string();
        script
    }

    fn goto(id: &str, url: &str) -> TestStep {
        TestStep::new(StepType::Goto, Platform::Web)
            .with_id(id)
            .with_param("url", url)
    }

    fn click(id: &str, selector: &str) -> TestStep {
        TestStep::new(StepType::Click, Platform::Web)
            .with_id(id)
            .with_param("locator", json!({"type": "css", "value": selector}))
    }

    #[test]
    fn empty_script_needs_a_name() {
        let script = Script::create_empty(Platform::Api, Framework::Httprunner);
        let result = script.validate();
        assert!(!result.valid);
        assert_eq!(result.errors.keys().collect::<Vec<_>>(), vec!["name"]);
        assert!(web_script().validate().valid);
    }

    #[test]
    fn well_formed_script_is_valid() {
        let mut script = web_script();
        script.variables.insert("base_url".to_string(), json!("https://example.com"));
        script.timeout_seconds = Some(30.0);
        script.retry_count = Some(2);
        script.push_step(None, goto("s1", "https://example.com/login")).unwrap();
        script.push_step(None, click("s2", "#submit")).unwrap();
        let result = script.validate();
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn param_errors_are_keyed_by_path() {
        let mut script = web_script();
        let mut retry = TestStep::new(StepType::Retry, Platform::Web).with_id("r");
        retry.children = vec![
            goto("g", "javascript:alert(1)"),
            click("c", "div<script>x</script>"),
        ];
        script.push_step(None, retry).unwrap();

        let result = script.validate();
        assert_eq!(
            result.errors.get("steps[0].children[0].params.url").map(String::as_str),
            Some("the javascript: scheme is not allowed")
        );
        assert!(result
            .errors
            .contains_key("steps[0].children[1].params.locator.value"));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn platform_kind_mismatch_is_reported() {
        let mut script = web_script();
        let tap = TestStep::bare("t", StepType::Tap);
        assert!(matches!(
            script.insert_step(None, 0, tap.clone()),
            Err(TreeError::UnsupportedKind { .. })
        ));
        assert!(script.steps.is_empty());

        let mut loaded = web_script();
        loaded.steps = StepTree::from(vec![tap]);
        let result = loaded.validate();
        assert_eq!(
            result.errors.get("steps[0].type").map(String::as_str),
            Some("step type 'tap' is not available on platform 'web'")
        );
    }

    #[test]
    fn duplicate_ids_name_both_positions() {
        let mut script = web_script();
        script.steps = StepTree::from(vec![
            goto("same", "https://a.example"),
            TestStep::bare("loop", StepType::Loop)
                .with_param("loop_type", "count")
                .with_param("loop_count", 2)
                .with_children(vec![goto("same", "https://b.example")]),
        ]);
        let result = script.validate();
        let message = result
            .errors
            .get("steps[1].children[0].id")
            .expect("duplicate id reported");
        assert!(message.contains("'same'"));
        assert!(message.contains("steps[0]"));
    }

    #[test]
    fn empty_flow_control_fails_validation_only() {
        let mut script = web_script();
        let empty_loop = TestStep::new(StepType::Loop, Platform::Web).with_id("l");
        script.insert_step(None, 0, empty_loop).expect("structurally legal");
        let result = script.validate();
        assert_eq!(
            result.errors.get("steps[0].children").map(String::as_str),
            Some("flow-control step 'loop' must contain at least one child step")
        );

        let mut skip_only = web_script();
        skip_only
            .push_step(None, TestStep::new(StepType::Skip, Platform::Web))
            .unwrap();
        assert!(skip_only.validate().valid);
    }

    #[test]
    fn leaf_with_children_in_document_is_reported() {
        let mut script = web_script();
        script.steps = StepTree::from(vec![
            goto("g", "https://example.com").with_children(vec![goto("h", "https://example.com")]),
        ]);
        let result = script.validate();
        assert_eq!(
            result.errors.get("steps[0].children").map(String::as_str),
            Some("step type 'goto' cannot contain child steps")
        );
    }

    #[test]
    fn hidden_params_are_not_required() {
        let mut script = web_script();
        let mut loop_step = TestStep::new(StepType::Loop, Platform::Web).with_id("l");
        loop_step.children = vec![goto("g", "https://example.com")];
        script.push_step(None, loop_step).unwrap();
        assert!(script.validate().valid);

        let step = script.steps.find_mut("l").unwrap();
        step.params.insert("loop_type".to_string(), json!("foreach"));
        let result = script.validate();
        assert!(result.errors.contains_key("steps[0].params.loop_variable"));
        assert!(result.errors.contains_key("steps[0].params.loop_items"));
        assert!(!result.errors.contains_key("steps[0].params.loop_count"));
    }

    #[test]
    fn select_and_number_params_are_checked() {
        let mut script = Script::create_empty(Platform::Api, Framework::Httprunner);
        script.name = "Users API".to_string();
        let request = TestStep::new(StepType::HttpRequest, Platform::Api)
            .with_id("req")
            .with_param("method", "FETCH")
            .with_param("url", "https://api.example.com/users")
            .with_param("timeout", 900)
            .with_param("body", "{broken");
        script.push_step(None, request).unwrap();

        let result = script.validate();
        assert!(result.errors["steps[0].params.method"].starts_with("method must be one of: GET"));
        assert_eq!(
            result.errors["steps[0].params.timeout"],
            "timeout must not be greater than 300"
        );
        assert!(result.errors["steps[0].params.body"].starts_with("body is not valid JSON"));
    }

    #[test]
    fn empty_optional_locator_is_skipped() {
        let mut script = web_script();
        let assert_page = TestStep::new(StepType::AssertText, Platform::Web)
            .with_id("a")
            .with_param("locator", json!({}))
            .with_param("text", "Welcome");
        script.push_step(None, assert_page).unwrap();
        assert!(script.validate().valid);

        let step = script.steps.find_mut("a").unwrap();
        step.params.insert("locator".to_string(), json!({ "value": "#banner" }));
        let result = script.validate();
        assert!(result.errors.contains_key("steps[0].params.locator.type"));
    }

    #[test]
    fn unknown_params_are_tolerated() {
        let mut script = web_script();
        script
            .push_step(None, goto("g", "https://example.com").with_param("legacy", json!([1, 2])))
            .unwrap();
        assert!(script.validate().valid);
    }

    #[test]
    fn metadata_checks() {
        let mut script = Script::create_empty(Platform::Mobile, Framework::Selenium);
        script.name = "x".to_string();
        script.variables.insert("1bad".to_string(), json!(1));
        script.timeout_seconds = Some(0.0);
        script.retry_count = Some(11);
        script.is_module = true;

        let result = script.validate();
        for field in [
            "name",
            "framework",
            "variables.1bad",
            "timeout_seconds",
            "retry_count",
            "module_name",
        ] {
            assert!(result.errors.contains_key(field), "missing {field}: {result:?}");
        }
        assert_eq!(
            result.errors["framework"],
            "framework 'selenium' is not available for platform 'mobile'"
        );
    }

    #[test]
    fn config_limits_apply() {
        let mut script = web_script();
        script.retry_count = Some(5);
        let strict = ValidationConfig {
            max_retry_count: 3,
            ..ValidationConfig::default()
        };
        assert!(script.validate().valid);
        assert!(script.validate_with(&strict).errors.contains_key("retry_count"));
    }

    #[test]
    fn validation_is_repeatable() {
        let step = goto("g", "ftp://example.com");
        let config = ValidationConfig::default();
        let first = validate_step(&step, Platform::Web, &config);
        let second = validate_step(&step, Platform::Web, &config);
        assert_eq!(first, second);
        assert!(first.errors.contains_key("steps[0].params.url"));
    }

    #[test]
    fn document_round_trip_accepts_original_keys() {
        let script = Script::from_value(json!({
            "name": "Checkout",
            "type": "web",
            "framework": "playwright",
            "timeout": 60,
            "retry_count": 1,
            "is_module": false,
            "data_driven": false,
            "steps": [
                {"id": "s1", "type": "goto", "name": "Open", "params": {"url": "https://shop.example"}}
            ]
        }))
        .expect("parse document");
        assert_eq!(script.platform, Platform::Web);
        assert_eq!(script.timeout_seconds, Some(60.0));
        assert!(script.validate().valid);

        let json = script.to_json_pretty().expect("serialize");
        let back = Script::from_json(&json).expect("reparse");
        assert_eq!(back, script);
    }

    #[test]
    fn unknown_step_type_fails_to_load() {
        let err = Script::from_json(
            r#"{"name":"x","platform":"web","framework":"selenium","steps":[{"id":"a","type":"warp","name":"?"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid script document"));
    }
}
