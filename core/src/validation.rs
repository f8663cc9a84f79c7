use crate::config::ValidationConfig;
use crate::locator::{Locator, RawLocator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("markup pattern"));

static INJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)javascript:",
        r"(?i)on\w+\s*=",
        r"(?i)<script",
        r"(?i)\beval\s*\(",
        r"(?i)document\.",
        r"(?i)window\.",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("injection pattern"))
    .collect()
});

static SCRIPT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_\-\s\x{4e00}-\x{9fa5}]+$").expect("script name pattern")
});

const RESERVED_WORDS: [&str; 6] = ["true", "false", "null", "undefined", "NaN", "Infinity"];
const ALLOWED_URL_SCHEMES: [&str; 3] = ["http", "https", "file"];
const FORBIDDEN_PATH_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            field: None,
        }
    }

    pub fn invalid(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            field: Some(field.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn at(mut self, field: impl Into<String>) -> Self {
        if !self.valid {
            self.field = Some(field.into());
        }
        self
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.field, &self.error) {
            _ if self.valid => f.write_str("valid"),
            (Some(field), Some(error)) => write!(f, "{field}: {error}"),
            (None, Some(error)) => f.write_str(error),
            _ => f.write_str("invalid"),
        }
    }
}

pub fn validate_selector(value: &str) -> ValidationResult {
    const FIELD: &str = "selector";
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return ValidationResult::invalid(FIELD, "selector cannot be empty");
    }

    if MARKUP_TAG.is_match(trimmed) {
        return ValidationResult::invalid(FIELD, "selector cannot contain HTML tags");
    }

    if INJECTION_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(trimmed))
    {
        return ValidationResult::invalid(FIELD, "selector contains forbidden script content");
    }

    if trimmed.starts_with("//") && !is_valid_xpath(trimmed) {
        return ValidationResult::invalid(FIELD, "invalid XPath syntax");
    }

    if (trimmed.starts_with('#') || trimmed.starts_with('.')) && !is_valid_css_shorthand(trimmed) {
        return ValidationResult::invalid(FIELD, "invalid CSS selector syntax");
    }

    ValidationResult::ok()
}

fn is_valid_xpath(xpath: &str) -> bool {
    if xpath.contains("///") {
        return false;
    }

    let chars: Vec<char> = xpath.chars().collect();
    for (idx, ch) in chars.iter().enumerate() {
        if matches!(ch, '<' | '>') {
            let operand = chars.get(idx + 1);
            let is_operator =
                matches!(operand, Some(next) if next.is_ascii_alphabetic() || matches!(next, '/' | '=' | '!'));
            if !is_operator {
                return false;
            }
        }
    }

    balanced(xpath, &[('[', ']')])
}

fn is_valid_css_shorthand(selector: &str) -> bool {
    if !balanced(selector, &[('[', ']'), ('(', ')')]) {
        return false;
    }
    !selector
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '{' | '}' | '\\'))
}

fn balanced(input: &str, pairs: &[(char, char)]) -> bool {
    let mut depth = vec![0i64; pairs.len()];
    for ch in input.chars() {
        for (slot, (open, close)) in pairs.iter().enumerate() {
            if ch == *open {
                depth[slot] += 1;
            } else if ch == *close {
                depth[slot] -= 1;
                if depth[slot] < 0 {
                    return false;
                }
            }
        }
    }
    depth.iter().all(|d| *d == 0)
}

pub fn validate_locator(locator: &Locator) -> ValidationResult {
    validate_selector(&locator.value)
}

pub fn validate_raw_locator(locator: &RawLocator) -> ValidationResult {
    match locator.parse() {
        Ok(parsed) => validate_locator(&parsed),
        Err(err) => ValidationResult::invalid("locator.type", err.to_string()),
    }
}

pub fn validate_url(url: &str) -> ValidationResult {
    const FIELD: &str = "url";
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return ValidationResult::invalid(FIELD, "URL cannot be empty");
    }

    let lowered = trimmed.to_ascii_lowercase();
    for scheme in ["javascript:", "data:"] {
        if lowered.starts_with(scheme) {
            return ValidationResult::invalid(
                FIELD,
                format!("the {scheme} scheme is not allowed"),
            );
        }
    }

    match Url::parse(trimmed) {
        Ok(parsed) if ALLOWED_URL_SCHEMES.contains(&parsed.scheme()) => ValidationResult::ok(),
        Ok(parsed) => {
            ValidationResult::invalid(FIELD, format!("unsupported scheme: {}", parsed.scheme()))
        }
        Err(err) => ValidationResult::invalid(FIELD, format!("invalid URL: {err}")),
    }
}

#[derive(Debug, Clone)]
pub struct TextRules<'a> {
    pub field: &'a str,
    pub min_length: usize,
    pub max_length: usize,
    pub required: bool,
    pub pattern: Option<&'a Regex>,
}

impl<'a> TextRules<'a> {
    pub fn new(field: &'a str) -> Self {
        Self {
            field,
            min_length: 0,
            max_length: ValidationConfig::DEFAULT_MAX_TEXT_LENGTH,
            required: false,
            pattern: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    pub fn pattern(mut self, pattern: &'a Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

impl Default for TextRules<'_> {
    fn default() -> Self {
        TextRules::new("text")
    }
}

pub fn validate_text(value: &str, rules: &TextRules<'_>) -> ValidationResult {
    let field = rules.field;
    if rules.required && value.trim().is_empty() {
        return ValidationResult::invalid(field, format!("{field} cannot be empty"));
    }
    if value.is_empty() {
        return ValidationResult::ok();
    }

    let length = value.chars().count();
    if length < rules.min_length {
        return ValidationResult::invalid(
            field,
            format!("{field} must be at least {} characters", rules.min_length),
        );
    }
    if length > rules.max_length {
        return ValidationResult::invalid(
            field,
            format!("{field} must be at most {} characters", rules.max_length),
        );
    }
    if let Some(pattern) = rules.pattern {
        if !pattern.is_match(value) {
            return ValidationResult::invalid(field, format!("{field} has an invalid format"));
        }
    }

    ValidationResult::ok()
}

pub fn validate_step_name(name: &str) -> ValidationResult {
    validate_step_name_with(name, &ValidationConfig::default())
}

pub fn validate_step_name_with(name: &str, config: &ValidationConfig) -> ValidationResult {
    let rules = TextRules::new("step name")
        .required()
        .min_length(1)
        .max_length(config.step_name_max_length);
    validate_text(name, &rules)
}

pub fn validate_script_name(name: &str) -> ValidationResult {
    validate_script_name_with(name, &ValidationConfig::default())
}

pub fn validate_script_name_with(name: &str, config: &ValidationConfig) -> ValidationResult {
    let rules = TextRules::new("script name")
        .required()
        .min_length(config.script_name_min_length)
        .max_length(config.script_name_max_length)
        .pattern(&SCRIPT_NAME);
    validate_text(name, &rules)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberRules<'a> {
    pub field: &'a str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub required: bool,
    pub integer: bool,
}

impl<'a> NumberRules<'a> {
    pub fn new(field: &'a str) -> Self {
        Self {
            field,
            min: None,
            max: None,
            required: false,
            integer: false,
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
}

pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn validate_number(value: &Value, rules: &NumberRules<'_>) -> ValidationResult {
    let field = rules.field;
    if is_missing(value) {
        return if rules.required {
            ValidationResult::invalid(field, format!("{field} cannot be empty"))
        } else {
            ValidationResult::ok()
        };
    }

    let Some(number) = parse_number(value) else {
        return ValidationResult::invalid(field, format!("{field} must be a valid number"));
    };

    if rules.integer && number.fract() != 0.0 {
        return ValidationResult::invalid(field, format!("{field} must be an integer"));
    }
    if let Some(min) = rules.min {
        if number < min {
            return ValidationResult::invalid(field, format!("{field} must not be less than {min}"));
        }
    }
    if let Some(max) = rules.max {
        if number > max {
            return ValidationResult::invalid(
                field,
                format!("{field} must not be greater than {max}"),
            );
        }
    }

    ValidationResult::ok()
}

pub fn validate_timeout(value: &Value) -> ValidationResult {
    validate_timeout_with(value, &ValidationConfig::default())
}

pub fn validate_timeout_with(value: &Value, config: &ValidationConfig) -> ValidationResult {
    let rules = NumberRules::new("timeout")
        .required()
        .min(config.timeout_min_seconds)
        .max(config.timeout_max_seconds);
    validate_number(value, &rules)
}

pub fn validate_json(input: &str) -> ValidationResult {
    validate_json_field(input, "json", false)
}

pub fn validate_json_field(input: &str, field: &str, required: bool) -> ValidationResult {
    if input.trim().is_empty() {
        return if required {
            ValidationResult::invalid(field, format!("{field} cannot be empty"))
        } else {
            ValidationResult::ok()
        };
    }

    match serde_json::from_str::<Value>(input) {
        Ok(_) => ValidationResult::ok(),
        Err(err) => ValidationResult::invalid(field, format!("{field} is not valid JSON: {err}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    Regex,
    Jsonpath,
    Numeric,
    Generic,
}

impl FromStr for AssertionKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "regex" => AssertionKind::Regex,
            "jsonpath" => AssertionKind::Jsonpath,
            "numeric" => AssertionKind::Numeric,
            _ => AssertionKind::Generic,
        })
    }
}

pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

pub fn validate_assertion(value: &Value, kind: AssertionKind) -> ValidationResult {
    const FIELD: &str = "assertion.value";
    if matches!(value, Value::Null) || value.as_str() == Some("") {
        return ValidationResult::invalid(FIELD, "assertion value cannot be empty");
    }

    let text = scalar_text(value).unwrap_or_else(|| Cow::Owned(value.to_string()));
    match kind {
        AssertionKind::Regex => match fancy_regex::Regex::new(&text) {
            Ok(_) => ValidationResult::ok(),
            Err(err) => {
                ValidationResult::invalid(FIELD, format!("invalid regular expression: {err}"))
            }
        },
        AssertionKind::Jsonpath if !text.starts_with('$') => {
            ValidationResult::invalid(FIELD, "JSONPath must start with $")
        }
        AssertionKind::Numeric if parse_number(value).is_none() => {
            ValidationResult::invalid(FIELD, "assertion value must be a number")
        }
        _ => ValidationResult::ok(),
    }
}

pub fn validate_file_path(path: &str) -> ValidationResult {
    const FIELD: &str = "file_path";
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return ValidationResult::invalid(FIELD, "file path cannot be empty");
    }

    if trimmed.contains("../") || trimmed.contains("..\\") {
        return ValidationResult::invalid(FIELD, "file path cannot contain ../");
    }

    if trimmed
        .chars()
        .any(|ch| ch.is_ascii_control() || FORBIDDEN_PATH_CHARS.contains(&ch))
    {
        return ValidationResult::invalid(FIELD, "file path contains invalid characters");
    }

    ValidationResult::ok()
}

pub fn validate_variable_name(name: &str) -> ValidationResult {
    const FIELD: &str = "variable_name";
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return ValidationResult::invalid(FIELD, "variable name cannot be empty");
    };

    if !(first.is_ascii_alphabetic() || first == '_') {
        return ValidationResult::invalid(
            FIELD,
            "variable name must start with a letter or underscore",
        );
    }

    if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return ValidationResult::invalid(
            FIELD,
            "variable name may only contain letters, digits and underscores",
        );
    }

    if RESERVED_WORDS.contains(&trimmed) {
        return ValidationResult::invalid(FIELD, format!("'{trimmed}' is a reserved word"));
    }

    ValidationResult::ok()
}

pub type FieldValidator<'a> = Box<dyn Fn(&Value) -> ValidationResult + 'a>;

pub struct FieldCheck<'a> {
    pub value: Value,
    pub validator: FieldValidator<'a>,
}

impl<'a> FieldCheck<'a> {
    pub fn new(
        value: impl Into<Value>,
        validator: impl Fn(&Value) -> ValidationResult + 'a,
    ) -> Self {
        Self {
            value: value.into(),
            validator: Box::new(validator),
        }
    }

    pub fn run(&self) -> ValidationResult {
        (self.validator)(&self.value)
    }
}

impl fmt::Debug for FieldCheck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCheck")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchValidation {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl BatchValidation {
    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn validate_fields<'a, K>(fields: impl IntoIterator<Item = (K, FieldCheck<'a>)>) -> BatchValidation
where
    K: Into<String>,
{
    let mut errors = BTreeMap::new();
    for (name, check) in fields {
        let result = check.run();
        if !result.valid {
            let message = result.error.unwrap_or_else(|| "invalid value".to_string());
            errors.insert(name.into(), message);
        }
    }
    BatchValidation::from_errors(errors)
}
