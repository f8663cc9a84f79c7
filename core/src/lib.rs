pub mod catalog;
pub mod config;
pub mod execution;
pub mod history;
pub mod kind;
pub mod locator;
pub mod param;
pub mod platform;
pub mod sanitize;
pub mod script;
pub mod step;
pub mod tree;
pub mod validation;

pub use catalog::{
    default_params, is_valid_kind, step_categories, step_definition, CatalogBundle, StepCatalog,
    StepCategory, StepDefinition,
};
pub use config::{EditorConfig, StepforgeConfig, ValidationConfig};
pub use execution::{ResultSummary, ScriptResult, StepResult, StepStatus};
pub use history::History;
pub use kind::{StepType, UnknownStepType};
pub use locator::{Locator, LocatorStrategy, RawLocator, UnknownStrategy};
pub use param::{ParamFormat, ParamKind, ParamSchema, Params, SelectOption, VisibleWhen};
pub use platform::{Framework, Platform, UnknownFramework, UnknownPlatform};
pub use sanitize::{sanitize_input, sanitize_selector};
pub use script::{validate_step, DocumentError, Script};
pub use step::TestStep;
pub use tree::{StepPath, StepTree, TreeError, Walk};
pub use validation::{
    validate_assertion, validate_fields, validate_file_path, validate_json, validate_locator,
    validate_number, validate_script_name, validate_selector, validate_step_name, validate_text,
    validate_timeout, validate_url, validate_variable_name, AssertionKind, BatchValidation,
    FieldCheck, NumberRules, TextRules, ValidationResult,
};
