use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! step_types {
    ($($variant:ident => $name:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum StepType {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl StepType {
            pub const ALL: &'static [StepType] = &[$(StepType::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(StepType::$variant => $name,)+
                }
            }
        }

        impl FromStr for StepType {
            type Err = UnknownStepType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(StepType::$variant),)+
                    other => Err(UnknownStepType(other.to_string())),
                }
            }
        }
    };
}

step_types! {
    // navigation
    Goto => "goto",
    Refresh => "refresh",
    Back => "back",
    Forward => "forward",
    Scroll => "scroll",
    // element interaction
    Click => "click",
    DoubleClick => "double_click",
    RightClick => "right_click",
    Hover => "hover",
    Input => "input",
    Clear => "clear",
    Select => "select",
    Checkbox => "checkbox",
    Radio => "radio",
    // page assertions
    AssertText => "assert_text",
    AssertElement => "assert_element",
    AssertVisible => "assert_visible",
    AssertEnabled => "assert_enabled",
    AssertTitle => "assert_title",
    AssertUrl => "assert_url",
    // waits
    Wait => "wait",
    WaitElement => "wait_element",
    WaitText => "wait_text",
    // windows and frames
    SwitchWindow => "switch_window",
    SwitchFrame => "switch_frame",
    SwitchDefault => "switch_default",
    NewTab => "new_tab",
    CloseTab => "close_tab",
    // keyboard
    PressKey => "press_key",
    PressKeys => "press_keys",
    // files
    Upload => "upload",
    Download => "download",
    // cookies, storage, extraction
    GetCookie => "get_cookie",
    SetCookie => "set_cookie",
    GetStorage => "get_storage",
    SetStorage => "set_storage",
    Extract => "extract",
    // advanced
    Screenshot => "screenshot",
    ExecuteScript => "execute_script",
    ExecuteAsyncScript => "execute_async_script",
    DragAndDrop => "drag_and_drop",
    // device
    Swipe => "swipe",
    Tap => "tap",
    LongPress => "long_press",
    Rotate => "rotate",
    Shake => "shake",
    // app control
    LaunchApp => "launch_app",
    CloseApp => "close_app",
    ResetApp => "reset_app",
    InstallApp => "install_app",
    UninstallApp => "uninstall_app",
    // mobile contexts
    SwitchContext => "switch_context",
    SwitchToWeb => "switch_to_web",
    SwitchToNative => "switch_to_native",
    // http
    HttpRequest => "http_request",
    GraphqlRequest => "graphql_request",
    // response validation
    AssertStatus => "assert_status",
    AssertJsonpath => "assert_jsonpath",
    AssertHeader => "assert_header",
    AssertResponseTime => "assert_response_time",
    AssertBodyContains => "assert_body_contains",
    AssertSchema => "assert_schema",
    // response extraction
    ExtractJsonpath => "extract_jsonpath",
    ExtractHeader => "extract_header",
    SetVariable => "set_variable",
    // flow control
    If => "if",
    Loop => "loop",
    Retry => "retry",
    Skip => "skip",
    // module reference
    Module => "module",
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown step type '{0}'")]
pub struct UnknownStepType(pub String);

impl StepType {
    pub fn is_flow_control(&self) -> bool {
        matches!(self, StepType::If | StepType::Loop | StepType::Retry)
    }

    pub fn is_module(&self) -> bool {
        matches!(self, StepType::Module)
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
