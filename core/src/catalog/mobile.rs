use super::{element_locator, element_step, empty_locator, fixed_wait, StepCategory, StepDefinition};
use crate::kind::StepType;
use crate::param::{ParamFormat, ParamSchema, SelectOption};
use serde_json::json;

pub(super) fn categories() -> Vec<StepCategory> {
    vec![device(), app(), context(), assertion(), wait()]
}

fn device() -> StepCategory {
    StepCategory::new(
        "device",
        "Device",
        vec![
            StepDefinition::new(StepType::Swipe, "Swipe", "Swipe across the screen")
                .defaults(json!({ "direction": "up", "duration_ms": 500 }))
                .param(
                    ParamSchema::select(
                        "direction",
                        "Direction",
                        vec![
                            SelectOption::new("Up", "up"),
                            SelectOption::new("Down", "down"),
                            SelectOption::new("Left", "left"),
                            SelectOption::new("Right", "right"),
                        ],
                    )
                    .required(),
                )
                .param(ParamSchema::number("duration_ms", "Duration (ms)").default_value(500)),
            StepDefinition::new(StepType::Tap, "Tap", "Tap the screen or an element")
                .defaults(json!({ "locator": empty_locator(), "x": 0, "y": 0 }))
                .param(ParamSchema::locator("locator", "Element locator"))
                .param(
                    ParamSchema::number("x", "X")
                        .default_value(0)
                        .describe("Used when no locator is set"),
                )
                .param(
                    ParamSchema::number("y", "Y")
                        .default_value(0)
                        .describe("Used when no locator is set"),
                ),
            StepDefinition::new(StepType::LongPress, "Long press", "Press and hold an element")
                .defaults(json!({ "locator": empty_locator(), "duration_ms": 1000 }))
                .param(element_locator())
                .param(ParamSchema::number("duration_ms", "Duration (ms)").default_value(1000)),
            StepDefinition::new(StepType::Rotate, "Rotate", "Change the screen orientation")
                .defaults(json!({ "orientation": "portrait" }))
                .param(
                    ParamSchema::select(
                        "orientation",
                        "Orientation",
                        vec![
                            SelectOption::new("Portrait", "portrait"),
                            SelectOption::new("Landscape", "landscape"),
                        ],
                    )
                    .required(),
                ),
            StepDefinition::new(StepType::Shake, "Shake", "Simulate shaking the device"),
        ],
    )
}

fn app() -> StepCategory {
    StepCategory::new(
        "app",
        "App control",
        vec![
            StepDefinition::new(StepType::LaunchApp, "Launch app", "Start an application")
                .defaults(json!({ "app_package": "", "app_activity": "" }))
                .param(
                    ParamSchema::text("app_package", "Package")
                        .required()
                        .placeholder("com.example.app"),
                )
                .param(
                    ParamSchema::text("app_activity", "Activity")
                        .placeholder("com.example.app.MainActivity"),
                ),
            StepDefinition::new(StepType::CloseApp, "Close app", "Close the current application"),
            StepDefinition::new(
                StepType::ResetApp,
                "Reset app",
                "Reset the application to its initial state",
            ),
            StepDefinition::new(StepType::InstallApp, "Install app", "Install an application")
                .defaults(json!({ "app_path": "" }))
                .param(
                    ParamSchema::text("app_path", "Application file")
                        .required()
                        .format(ParamFormat::FilePath)
                        .placeholder("/path/to/app.apk"),
                ),
            StepDefinition::new(
                StepType::UninstallApp,
                "Uninstall app",
                "Remove an application from the device",
            )
            .defaults(json!({ "app_package": "" }))
            .param(
                ParamSchema::text("app_package", "Package")
                    .required()
                    .placeholder("com.example.app"),
            ),
        ],
    )
}

fn context() -> StepCategory {
    StepCategory::new(
        "context",
        "Contexts",
        vec![
            StepDefinition::new(
                StepType::SwitchContext,
                "Switch context",
                "Switch to NATIVE_APP or WEBVIEW",
            )
            .defaults(json!({ "context": "" }))
            .param(
                ParamSchema::select(
                    "context",
                    "Context",
                    vec![
                        SelectOption::new("Native app", "NATIVE_APP"),
                        SelectOption::new("WebView (auto)", "WEBVIEW"),
                    ],
                )
                .required(),
            ),
            StepDefinition::new(
                StepType::SwitchToWeb,
                "Switch to web",
                "Switch to the WebView context",
            ),
            StepDefinition::new(
                StepType::SwitchToNative,
                "Switch to native",
                "Switch to the native app context",
            ),
        ],
    )
}

fn assertion() -> StepCategory {
    StepCategory::new(
        "mobile_assertion",
        "Assertions",
        vec![
            element_step(
                StepType::AssertElement,
                "Assert element",
                "Check that an element exists",
            ),
            StepDefinition::new(StepType::AssertText, "Assert text", "Check an element's text")
                .defaults(json!({ "locator": empty_locator(), "text": "" }))
                .param(element_locator())
                .param(ParamSchema::text("text", "Expected text").required()),
        ],
    )
}

fn wait() -> StepCategory {
    StepCategory::new(
        "mobile_wait",
        "Wait",
        vec![
            fixed_wait(true),
            StepDefinition::new(
                StepType::WaitElement,
                "Wait for element",
                "Wait until an element appears",
            )
            .defaults(json!({ "locator": empty_locator(), "timeout": 10 }))
            .param(element_locator())
            .param(
                ParamSchema::number("timeout", "Timeout (s)")
                    .required()
                    .default_value(10)
                    .min(1.0)
                    .max(300.0),
            ),
        ],
    )
}
