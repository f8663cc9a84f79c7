use super::{StepCategory, StepDefinition};
use crate::kind::StepType;
use crate::param::{ParamFormat, ParamSchema, SelectOption, VisibleWhen};
use serde_json::json;

pub(super) fn categories() -> Vec<StepCategory> {
    vec![flow(), module()]
}

fn loop_type_is(value: &'static str) -> VisibleWhen {
    VisibleWhen::Equals {
        field: "loop_type",
        value: json!(value),
    }
}

fn flow() -> StepCategory {
    StepCategory::new(
        "flow",
        "Flow control",
        vec![
            StepDefinition::new(
                StepType::If,
                "If",
                "Run the child steps when a condition holds",
            )
            .defaults(json!({ "condition": "" }))
            .param(
                ParamSchema::text("condition", "Condition")
                    .required()
                    .placeholder("${status} == 200"),
            ),
            StepDefinition::new(StepType::Loop, "Loop", "Repeat the child steps")
                .defaults(json!({ "loop_type": "count", "loop_count": 1 }))
                .param(
                    ParamSchema::select(
                        "loop_type",
                        "Loop type",
                        vec![
                            SelectOption::new("Fixed count", "count"),
                            SelectOption::new("While condition", "while"),
                            SelectOption::new("For each item", "foreach"),
                        ],
                    )
                    .required(),
                )
                .param(
                    ParamSchema::number("loop_count", "Iterations")
                        .required()
                        .integer()
                        .min(1.0)
                        .max(1000.0)
                        .default_value(1)
                        .visible_when(loop_type_is("count")),
                )
                .param(
                    ParamSchema::text("loop_condition", "Condition")
                        .required()
                        .visible_when(loop_type_is("while")),
                )
                .param(
                    ParamSchema::text("loop_variable", "Item variable")
                        .required()
                        .format(ParamFormat::Identifier)
                        .visible_when(loop_type_is("foreach")),
                )
                .param(
                    ParamSchema::json("loop_items", "Items")
                        .required()
                        .placeholder(r#"["a", "b"]"#)
                        .visible_when(loop_type_is("foreach")),
                ),
            StepDefinition::new(
                StepType::Retry,
                "Retry",
                "Re-run the child steps until they pass",
            )
            .defaults(json!({ "retry_count": 3, "retry_delay": 1, "stop_on_failure": true }))
            .param(
                ParamSchema::number("retry_count", "Attempts")
                    .required()
                    .integer()
                    .min(1.0)
                    .max(10.0)
                    .default_value(3),
            )
            .param(
                ParamSchema::number("retry_delay", "Delay (s)")
                    .min(0.0)
                    .default_value(1),
            )
            .param(ParamSchema::checkbox("stop_on_failure", "Stop on failure").default_value(true)),
            StepDefinition::new(StepType::Skip, "Skip", "Mark the current iteration as skipped")
                .defaults(json!({ "reason": "" }))
                .param(ParamSchema::text("reason", "Reason")),
        ],
    )
}

fn module() -> StepCategory {
    StepCategory::new(
        "module",
        "Modules",
        vec![StepDefinition::new(
            StepType::Module,
            "Call module",
            "Run the steps of a reusable module script",
        )
        .defaults(json!({ "module_id": null, "module_name": "", "module_params": {} }))
        .param(
            ParamSchema::number("module_id", "Module")
                .required()
                .integer()
                .min(1.0),
        )
        .param(ParamSchema::text("module_name", "Module name"))
        .param(ParamSchema::json("module_params", "Module parameters"))],
    )
}
