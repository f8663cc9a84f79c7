use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    Xpath,
    Css,
    Id,
    Name,
    Class,
    Tag,
    LinkText,
    PartialLinkText,
}

impl LocatorStrategy {
    pub const ALL: [LocatorStrategy; 8] = [
        LocatorStrategy::Xpath,
        LocatorStrategy::Css,
        LocatorStrategy::Id,
        LocatorStrategy::Name,
        LocatorStrategy::Class,
        LocatorStrategy::Tag,
        LocatorStrategy::LinkText,
        LocatorStrategy::PartialLinkText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::Xpath => "xpath",
            LocatorStrategy::Css => "css",
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::Class => "class",
            LocatorStrategy::Tag => "tag",
            LocatorStrategy::LinkText => "link_text",
            LocatorStrategy::PartialLinkText => "partial_link_text",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locator strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for LocatorStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocatorStrategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(rename = "type")]
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Xpath, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Css, value)
    }

    pub fn placeholder() -> Self {
        Self::xpath("")
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.strategy.as_str(),
            "value": self.value,
        })
    }
}

// Persisted documents may carry an unknown or empty `type`; the raw strings
// are kept so the validator can report the exact offending field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLocator {
    pub strategy: Option<String>,
    pub value: Option<String>,
}

impl RawLocator {
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            strategy: object
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
            value: object
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty())
    }

    pub fn parse(&self) -> Result<Locator, UnknownStrategy> {
        let raw = self.strategy.as_deref().unwrap_or_default();
        let strategy = raw.parse::<LocatorStrategy>()?;
        Ok(Locator::new(strategy, self.value.clone().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_serializes_strategy_as_type() {
        let locator = Locator::new(LocatorStrategy::PartialLinkText, "Sign in");
        let json = serde_json::to_value(&locator).expect("serialize locator");
        assert_eq!(json["type"], "partial_link_text");
        assert_eq!(json["value"], "Sign in");
        assert_eq!(json, locator.to_value());
    }

    #[test]
    fn unknown_strategy_is_rejected_on_parse() {
        let err = "shadow".parse::<LocatorStrategy>().unwrap_err();
        assert_eq!(err.to_string(), "unknown locator strategy 'shadow'");
        assert!(serde_json::from_str::<Locator>(r#"{"type":"shadow","value":"x"}"#).is_err());
    }

    #[test]
    fn raw_locator_keeps_unparsed_fields() {
        let raw = RawLocator::from_value(&serde_json::json!({"type": "", "value": "#main"}))
            .expect("object locator");
        assert_eq!(raw.strategy.as_deref(), Some(""));
        assert!(!raw.is_blank());
        assert!(raw.parse().is_err());

        let placeholder = RawLocator::from_value(&Locator::placeholder().to_value()).unwrap();
        assert!(placeholder.is_blank());
        assert_eq!(placeholder.parse().unwrap(), Locator::xpath(""));
    }

    #[test]
    fn non_object_values_are_not_locators() {
        assert!(RawLocator::from_value(&serde_json::json!("//div")).is_none());
    }
}
