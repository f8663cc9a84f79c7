use super::{fixed_wait, operator_options, StepCategory, StepDefinition};
use crate::kind::StepType;
use crate::param::{ParamFormat, ParamSchema, SelectOption};
use serde_json::json;

const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

pub(super) fn categories() -> Vec<StepCategory> {
    vec![request(), validation(), extraction(), wait()]
}

fn request() -> StepCategory {
    StepCategory::new(
        "request",
        "Requests",
        vec![
            StepDefinition::new(StepType::HttpRequest, "HTTP request", "Send an HTTP/HTTPS request")
                .defaults(json!({
                    "method": "GET",
                    "url": "",
                    "headers": {},
                    "body": null,
                    "query_params": {},
                    "timeout": 30
                }))
                .param(
                    ParamSchema::select(
                        "method",
                        "Method",
                        HTTP_METHODS
                            .iter()
                            .map(|method| SelectOption::new(*method, *method))
                            .collect(),
                    )
                    .required(),
                )
                .param(
                    ParamSchema::text("url", "URL")
                        .required()
                        .format(ParamFormat::Url)
                        .placeholder("https://api.example.com/endpoint"),
                )
                .param(
                    ParamSchema::json("headers", "Headers")
                        .placeholder(r#"{"Content-Type": "application/json"}"#),
                )
                .param(ParamSchema::json("body", "Body").placeholder(r#"{"key": "value"}"#))
                .param(
                    ParamSchema::json("query_params", "Query parameters")
                        .placeholder(r#"{"param": "value"}"#),
                )
                .param(
                    ParamSchema::number("timeout", "Timeout (s)")
                        .default_value(30)
                        .min(1.0)
                        .max(300.0),
                ),
            StepDefinition::new(
                StepType::GraphqlRequest,
                "GraphQL request",
                "Send a GraphQL query",
            )
            .defaults(json!({ "url": "", "query": "", "variables": {}, "headers": {} }))
            .param(
                ParamSchema::text("url", "Endpoint")
                    .required()
                    .format(ParamFormat::Url)
                    .placeholder("https://api.example.com/graphql"),
            )
            .param(
                ParamSchema::textarea("query", "Query")
                    .required()
                    .placeholder("query { user { id name } }"),
            )
            .param(ParamSchema::json("variables", "Variables"))
            .param(ParamSchema::json("headers", "Headers")),
        ],
    )
}

fn validation() -> StepCategory {
    StepCategory::new(
        "validation",
        "Response checks",
        vec![
            StepDefinition::new(
                StepType::AssertStatus,
                "Assert status",
                "Check the HTTP status code",
            )
            .defaults(json!({ "status_code": 200, "operator": "eq" }))
            .param(
                ParamSchema::number("status_code", "Expected status")
                    .required()
                    .default_value(200),
            )
            .param(
                ParamSchema::select(
                    "operator",
                    "Operator",
                    operator_options(&["eq", "ne", "gt", "lt", "ge", "le"]),
                )
                .required(),
            ),
            StepDefinition::new(
                StepType::AssertJsonpath,
                "Assert JSONPath",
                "Check response data selected by a JSONPath",
            )
            .defaults(json!({ "json_path": "", "expected": "", "operator": "eq" }))
            .param(
                ParamSchema::text("json_path", "JSONPath")
                    .required()
                    .format(ParamFormat::JsonPath)
                    .placeholder("$.data.user.name"),
            )
            .param(ParamSchema::text("expected", "Expected value").required())
            .param(
                ParamSchema::select(
                    "operator",
                    "Operator",
                    operator_options(&["eq", "ne", "contains", "not_contains", "gt", "lt"]),
                )
                .required(),
            ),
            StepDefinition::new(
                StepType::AssertHeader,
                "Assert header",
                "Check a response header",
            )
            .defaults(json!({ "header_name": "", "header_value": "", "operator": "contains" }))
            .param(
                ParamSchema::text("header_name", "Header")
                    .required()
                    .placeholder("Content-Type"),
            )
            .param(ParamSchema::text("header_value", "Expected value").placeholder("application/json"))
            .param(ParamSchema::select(
                "operator",
                "Operator",
                operator_options(&["contains", "not_contains", "eq", "ne"]),
            )),
            StepDefinition::new(
                StepType::AssertResponseTime,
                "Assert response time",
                "Check how long the response took",
            )
            .defaults(json!({ "response_time": 1000, "operator": "le" }))
            .param(
                ParamSchema::number("response_time", "Response time (ms)")
                    .required()
                    .default_value(1000),
            )
            .param(
                ParamSchema::select("operator", "Operator", operator_options(&["lt", "le", "gt", "ge"]))
                    .required(),
            ),
            StepDefinition::new(
                StepType::AssertBodyContains,
                "Assert body contains",
                "Check that the response body contains a text",
            )
            .defaults(json!({ "text": "" }))
            .param(ParamSchema::text("text", "Text").required()),
            StepDefinition::new(
                StepType::AssertSchema,
                "Assert JSON schema",
                "Check the response against a JSON schema",
            )
            .defaults(json!({ "schema": "{}" }))
            .param(
                ParamSchema::textarea("schema", "JSON schema")
                    .required()
                    .format(ParamFormat::Json)
                    .placeholder(r#"{"type": "object", "properties": {...}}"#),
            ),
        ],
    )
}

fn extraction() -> StepCategory {
    let variable_name = || {
        ParamSchema::text("variable_name", "Variable name")
            .required()
            .format(ParamFormat::Identifier)
            .placeholder("myVariable")
    };

    StepCategory::new(
        "extraction",
        "Extraction",
        vec![
            StepDefinition::new(
                StepType::ExtractJsonpath,
                "Extract JSONPath",
                "Store response data selected by a JSONPath",
            )
            .defaults(json!({ "variable_name": "", "json_path": "" }))
            .param(variable_name())
            .param(
                ParamSchema::text("json_path", "JSONPath")
                    .required()
                    .format(ParamFormat::JsonPath)
                    .placeholder("$.data.user.name"),
            ),
            StepDefinition::new(
                StepType::ExtractHeader,
                "Extract header",
                "Store a response header value",
            )
            .defaults(json!({ "variable_name": "", "header_name": "" }))
            .param(variable_name())
            .param(
                ParamSchema::text("header_name", "Header")
                    .required()
                    .placeholder("Content-Type"),
            ),
            StepDefinition::new(StepType::SetVariable, "Set variable", "Assign a test variable")
                .defaults(json!({ "variable_name": "", "value": "" }))
                .param(variable_name())
                .param(ParamSchema::text("value", "Value").required()),
        ],
    )
}

fn wait() -> StepCategory {
    StepCategory::new("api_wait", "Wait", vec![fixed_wait(true)])
}
