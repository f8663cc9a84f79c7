mod api;
mod flow;
mod mobile;
mod web;

use crate::kind::StepType;
use crate::param::{ParamSchema, Params};
use crate::platform::Platform;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

const CATALOG_VERSION: &str = "1.0.0";

static CATALOG: Lazy<StepCatalog> = Lazy::new(StepCatalog::build);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDefinition {
    pub kind: StepType,
    pub label: &'static str,
    pub description: &'static str,
    pub default_params: Params,
    pub param_schema: Vec<ParamSchema>,
}

impl StepDefinition {
    pub(crate) fn new(kind: StepType, label: &'static str, description: &'static str) -> Self {
        Self {
            kind,
            label,
            description,
            default_params: Params::new(),
            param_schema: Vec::new(),
        }
    }

    pub(crate) fn defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(map) = defaults {
            self.default_params = map;
        }
        self
    }

    pub(crate) fn param(mut self, schema: ParamSchema) -> Self {
        self.param_schema.push(schema);
        self
    }

    pub fn schema_for(&self, name: &str) -> Option<&ParamSchema> {
        self.param_schema.iter().find(|schema| schema.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.schema_for(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepCategory {
    pub name: &'static str,
    pub label: &'static str,
    pub steps: Vec<StepDefinition>,
}

impl StepCategory {
    pub(crate) fn new(name: &'static str, label: &'static str, steps: Vec<StepDefinition>) -> Self {
        Self { name, label, steps }
    }
}

#[derive(Debug)]
struct PlatformCatalog {
    categories: Vec<StepCategory>,
    index: HashMap<StepType, (usize, usize)>,
}

impl PlatformCatalog {
    fn new(categories: Vec<StepCategory>) -> Self {
        let mut index = HashMap::new();
        for (category_idx, category) in categories.iter().enumerate() {
            for (step_idx, definition) in category.steps.iter().enumerate() {
                // First category wins when a kind is listed twice.
                index
                    .entry(definition.kind)
                    .or_insert((category_idx, step_idx));
            }
        }
        Self { categories, index }
    }

    fn definition(&self, kind: StepType) -> Option<&StepDefinition> {
        let (category, step) = *self.index.get(&kind)?;
        self.categories.get(category)?.steps.get(step)
    }
}

#[derive(Debug)]
pub struct StepCatalog {
    platforms: BTreeMap<Platform, PlatformCatalog>,
}

impl StepCatalog {
    pub fn global() -> &'static StepCatalog {
        &CATALOG
    }

    fn build() -> Self {
        let mut platforms = BTreeMap::new();
        for platform in Platform::ALL {
            let mut categories = match platform {
                Platform::Web => web::categories(),
                Platform::Mobile => mobile::categories(),
                Platform::Api => api::categories(),
            };
            categories.extend(flow::categories());
            let catalog = PlatformCatalog::new(categories);
            tracing::trace!(
                platform = %platform,
                kinds = catalog.index.len(),
                "step catalog built"
            );
            platforms.insert(platform, catalog);
        }
        Self { platforms }
    }

    pub fn categories(&self, platform: Platform) -> &[StepCategory] {
        self.platforms
            .get(&platform)
            .map(|catalog| catalog.categories.as_slice())
            .unwrap_or_default()
    }

    pub fn definition(&self, kind: StepType, platform: Platform) -> Option<&StepDefinition> {
        self.platforms.get(&platform)?.definition(kind)
    }

    pub fn default_params(&self, kind: StepType, platform: Platform) -> Params {
        self.definition(kind, platform)
            .map(|definition| definition.default_params.clone())
            .unwrap_or_default()
    }

    pub fn is_valid_kind(&self, kind: StepType, platform: Platform) -> bool {
        self.definition(kind, platform).is_some()
    }

    pub fn definitions(&self, platform: Platform) -> BTreeMap<StepType, &StepDefinition> {
        self.categories(platform)
            .iter()
            .flat_map(|category| category.steps.iter())
            .map(|definition| (definition.kind, definition))
            .fold(BTreeMap::new(), |mut acc, (kind, definition)| {
                acc.entry(kind).or_insert(definition);
                acc
            })
    }

    pub fn kinds(&self, platform: Platform) -> Vec<StepType> {
        self.definitions(platform).into_keys().collect()
    }

    pub fn platforms_for(&self, kind: StepType) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|platform| self.is_valid_kind(kind, *platform))
            .collect()
    }

    pub fn category_of(&self, kind: StepType, platform: Platform) -> Option<&StepCategory> {
        let (category, _) = *self.platforms.get(&platform)?.index.get(&kind)?;
        self.categories(platform).get(category)
    }

    pub fn bundle(&self) -> CatalogBundle {
        CatalogBundle {
            version: CATALOG_VERSION.to_string(),
            generated_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
            platforms: Platform::ALL
                .into_iter()
                .map(|platform| (platform, self.categories(platform).to_vec()))
                .collect(),
        }
    }
}

fn empty_locator() -> Value {
    crate::locator::Locator::placeholder().to_value()
}

fn element_locator() -> ParamSchema {
    ParamSchema::locator("locator", "Element locator").required()
}

fn element_step(kind: StepType, label: &'static str, description: &'static str) -> StepDefinition {
    StepDefinition::new(kind, label, description)
        .defaults(serde_json::json!({ "locator": empty_locator() }))
        .param(element_locator())
}

fn operator_options(operators: &[&'static str]) -> Vec<crate::param::SelectOption> {
    operators
        .iter()
        .map(|op| {
            let label = match *op {
                "eq" => "Equals",
                "ne" => "Not equals",
                "gt" => "Greater than",
                "lt" => "Less than",
                "ge" => "Greater or equal",
                "le" => "Less or equal",
                "contains" => "Contains",
                "not_contains" => "Does not contain",
                _ => "Other",
            };
            crate::param::SelectOption::new(label, *op)
        })
        .collect()
}

fn fixed_wait(with_type: bool) -> StepDefinition {
    let definition = StepDefinition::new(StepType::Wait, "Fixed wait", "Wait for a number of seconds")
        .defaults(serde_json::json!({ "wait_type": "fixed", "duration": 1 }));
    let definition = if with_type {
        definition.param(
            ParamSchema::select(
                "wait_type",
                "Wait type",
                vec![
                    crate::param::SelectOption::new("Fixed", "fixed"),
                    crate::param::SelectOption::new("Random", "random"),
                ],
            )
            .required(),
        )
    } else {
        definition
    };
    let duration = ParamSchema::number("duration", "Duration (s)")
        .required()
        .default_value(1)
        .min(0.1);
    definition.param(if with_type { duration.max(3600.0) } else { duration })
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogBundle {
    pub version: String,
    pub generated_at: String,
    pub platforms: BTreeMap<Platform, Vec<StepCategory>>,
}

pub fn step_categories(platform: Platform) -> &'static [StepCategory] {
    StepCatalog::global().categories(platform)
}

pub fn step_definition(kind: StepType, platform: Platform) -> Option<&'static StepDefinition> {
    StepCatalog::global().definition(kind, platform)
}

pub fn default_params(kind: StepType, platform: Platform) -> Params {
    StepCatalog::global().default_params(kind, platform)
}

pub fn is_valid_kind(kind: StepType, platform: Platform) -> bool {
    StepCatalog::global().is_valid_kind(kind, platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn each_platform_has_categories() {
        for platform in Platform::ALL {
            let categories = step_categories(platform);
            assert!(!categories.is_empty(), "{platform} has no categories");
            assert!(categories.iter().all(|category| !category.steps.is_empty()));
        }
        assert_eq!(step_categories(Platform::Web)[0].name, "navigation");
        assert_eq!(step_categories(Platform::Mobile)[0].name, "device");
        assert_eq!(step_categories(Platform::Api)[0].name, "request");
    }

    #[test]
    fn kinds_are_scoped_to_platforms() {
        assert!(is_valid_kind(StepType::Tap, Platform::Mobile));
        assert!(!is_valid_kind(StepType::Tap, Platform::Web));
        assert!(!is_valid_kind(StepType::Goto, Platform::Api));
        assert!(is_valid_kind(StepType::HttpRequest, Platform::Api));
        let api_kinds = StepCatalog::global().kinds(Platform::Api);
        assert!(api_kinds.contains(&StepType::AssertSchema));
        assert!(!api_kinds.contains(&StepType::Click));
        assert!(!is_valid_kind(StepType::HttpRequest, Platform::Mobile));
        assert_eq!(
            StepCatalog::global().platforms_for(StepType::Wait),
            vec![Platform::Web, Platform::Mobile, Platform::Api]
        );
    }

    #[test]
    fn flow_and_module_kinds_exist_everywhere() {
        for platform in Platform::ALL {
            for kind in [
                StepType::If,
                StepType::Loop,
                StepType::Retry,
                StepType::Skip,
                StepType::Module,
            ] {
                assert!(is_valid_kind(kind, platform), "{kind} missing on {platform}");
            }
        }
    }

    #[test]
    fn unknown_lookup_is_absent() {
        assert!(step_definition(StepType::Swipe, Platform::Api).is_none());
        assert!(default_params(StepType::Swipe, Platform::Api).is_empty());
    }

    #[test]
    fn default_params_are_independent_copies() {
        let mut first = default_params(StepType::Click, Platform::Web);
        match first.get_mut("locator") {
            Some(Value::Object(locator)) => {
                locator.insert("value".to_string(), json!("#changed"));
            }
            other => panic!("unexpected default locator: {other:?}"),
        }
        assert_eq!(first["locator"]["value"], "#changed");

        let second = default_params(StepType::Click, Platform::Web);
        assert_eq!(second["locator"], json!({"type": "xpath", "value": ""}));
        assert_eq!(
            step_definition(StepType::Click, Platform::Web)
                .unwrap()
                .default_params["locator"]["value"],
            ""
        );
    }

    #[test]
    fn defaults_only_use_declared_or_hidden_params() {
        // Extra default keys are allowed (e.g. wait_type) but every schema
        // entry must have a unique name within its definition.
        for platform in Platform::ALL {
            for definition in StepCatalog::global().definitions(platform).values() {
                let mut seen = HashSet::new();
                for schema in &definition.param_schema {
                    assert!(
                        seen.insert(schema.name),
                        "{} declares '{}' twice",
                        definition.kind,
                        schema.name
                    );
                }
            }
        }
    }

    #[test]
    fn platform_specific_definitions_differ() {
        let web = step_definition(StepType::AssertText, Platform::Web).unwrap();
        let mobile = step_definition(StepType::AssertText, Platform::Mobile).unwrap();
        assert!(!web.schema_for("locator").unwrap().required);
        assert!(mobile.schema_for("locator").unwrap().required);
        assert_eq!(
            StepCatalog::global()
                .category_of(StepType::AssertText, Platform::Mobile)
                .unwrap()
                .name,
            "mobile_assertion"
        );
    }

    #[test]
    fn bundle_covers_every_platform() {
        let bundle = StepCatalog::global().bundle();
        assert_eq!(bundle.version, CATALOG_VERSION);
        assert_eq!(bundle.platforms.len(), 3);
        let exported = serde_json::to_value(&bundle).unwrap();
        assert!(exported["platforms"]["api"].is_array());
    }
}
