use crate::catalog::StepCatalog;
use crate::kind::StepType;
use crate::param::Params;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StepType,
    pub name: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TestStep>,
}

fn enabled_by_default() -> bool {
    true
}

pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

impl TestStep {
    pub fn new(kind: StepType, platform: Platform) -> Self {
        let catalog = StepCatalog::global();
        let name = catalog
            .definition(kind, platform)
            .map(|definition| definition.label)
            .unwrap_or(kind.as_str());
        Self {
            id: fresh_id(),
            kind,
            name: name.to_string(),
            params: catalog.default_params(kind, platform),
            description: None,
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn bare(id: impl Into<String>, kind: StepType) -> Self {
        Self {
            id: id.into(),
            kind,
            name: kind.as_str().to_string(),
            params: Params::new(),
            description: None,
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<TestStep>) -> Self {
        self.children = children;
        self
    }

    pub fn is_flow_control(&self) -> bool {
        self.kind.is_flow_control()
    }

    pub fn subtree_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.id.as_str());
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id == id || self.children.iter().any(|child| child.contains(id))
    }

    pub(crate) fn find_leaf_with_children(&self) -> Option<&TestStep> {
        if !self.is_flow_control() && !self.children.is_empty() {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(TestStep::find_leaf_with_children)
    }

    pub(crate) fn refresh_ids(&mut self) {
        self.id = fresh_id();
        for child in &mut self.children {
            child.refresh_ids();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_step_takes_catalog_defaults() {
        let step = TestStep::new(StepType::Goto, Platform::Web);
        assert_eq!(step.name, "Open URL");
        assert_eq!(step.params["url"], "");
        assert!(step.enabled);
        assert!(Uuid::parse_str(&step.id).is_ok());

        let other = TestStep::new(StepType::Goto, Platform::Web);
        assert_ne!(step.id, other.id);
    }

    #[test]
    fn unknown_kind_for_platform_gets_empty_params() {
        let step = TestStep::new(StepType::Tap, Platform::Api);
        assert_eq!(step.name, "tap");
        assert!(step.params.is_empty());
    }

    #[test]
    fn document_shape_uses_type_key_and_omits_empty_children() {
        let step = TestStep::bare("s1", StepType::Click)
            .with_param("locator", json!({"type": "css", "value": "#go"}));
        let value = serde_json::to_value(&step).expect("serialize step");
        assert_eq!(value["type"], "click");
        assert!(value.get("children").is_none());
        assert!(value.get("description").is_none());

        let parsed: TestStep = serde_json::from_value(json!({
            "id": "s2",
            "type": "loop",
            "name": "Repeat",
            "children": [{"id": "s3", "type": "refresh", "name": "Reload"}]
        }))
        .expect("parse step");
        assert!(parsed.enabled);
        assert!(parsed.params.is_empty());
        assert_eq!(parsed.subtree_ids(), vec!["s2", "s3"]);
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let parsed = serde_json::from_value::<TestStep>(json!({
            "id": "x", "type": "teleport", "name": "?"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn refresh_ids_touches_whole_subtree() {
        let mut step = TestStep::bare("a", StepType::If)
            .with_children(vec![TestStep::bare("b", StepType::Click)]);
        step.refresh_ids();
        assert_ne!(step.id, "a");
        assert_ne!(step.children[0].id, "b");
        let child_id = step.children[0].id.clone();
        assert!(step.contains(&child_id));
    }
}
