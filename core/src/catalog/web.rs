use super::{element_locator, element_step, empty_locator, fixed_wait, StepCategory, StepDefinition};
use crate::kind::StepType;
use crate::param::{ParamFormat, ParamSchema, SelectOption, VisibleWhen};
use serde_json::json;

pub(super) fn categories() -> Vec<StepCategory> {
    vec![
        navigation(),
        element(),
        assertion(),
        wait(),
        window(),
        keyboard(),
        file(),
        data(),
        advanced(),
    ]
}

fn navigation() -> StepCategory {
    StepCategory::new(
        "navigation",
        "Navigation",
        vec![
            StepDefinition::new(StepType::Goto, "Open URL", "Navigate to the given URL")
                .defaults(json!({ "url": "" }))
                .param(
                    ParamSchema::text("url", "URL")
                        .required()
                        .format(ParamFormat::Url)
                        .placeholder("https://example.com"),
                ),
            StepDefinition::new(StepType::Refresh, "Refresh", "Reload the current page"),
            StepDefinition::new(StepType::Back, "Back", "Go back one entry in browser history"),
            StepDefinition::new(
                StepType::Forward,
                "Forward",
                "Go forward one entry in browser history",
            ),
            StepDefinition::new(StepType::Scroll, "Scroll", "Scroll the page to a position")
                .defaults(json!({ "scroll_type": "bottom", "x": 0, "y": 0 }))
                .param(
                    ParamSchema::select(
                        "scroll_type",
                        "Scroll to",
                        vec![
                            SelectOption::new("Top", "top"),
                            SelectOption::new("Bottom", "bottom"),
                            SelectOption::new("Custom coordinates", "custom"),
                        ],
                    )
                    .required(),
                )
                .param(
                    ParamSchema::number("x", "X")
                        .default_value(0)
                        .visible_when(VisibleWhen::Equals {
                            field: "scroll_type",
                            value: json!("custom"),
                        }),
                )
                .param(
                    ParamSchema::number("y", "Y")
                        .default_value(0)
                        .visible_when(VisibleWhen::Equals {
                            field: "scroll_type",
                            value: json!("custom"),
                        }),
                ),
        ],
    )
}

fn element() -> StepCategory {
    StepCategory::new(
        "element",
        "Element",
        vec![
            element_step(StepType::Click, "Click", "Click an element"),
            element_step(StepType::DoubleClick, "Double click", "Double click an element"),
            element_step(StepType::RightClick, "Right click", "Right click an element"),
            element_step(StepType::Hover, "Hover", "Move the pointer over an element"),
            StepDefinition::new(StepType::Input, "Type text", "Type text into an input")
                .defaults(json!({ "locator": empty_locator(), "value": "", "clear_first": true }))
                .param(element_locator())
                .param(ParamSchema::text("value", "Text").required())
                .param(ParamSchema::checkbox("clear_first", "Clear first").default_value(true)),
            element_step(StepType::Clear, "Clear input", "Clear the content of an input"),
            StepDefinition::new(StepType::Select, "Select option", "Pick an option of a dropdown")
                .defaults(json!({ "locator": empty_locator(), "value": "" }))
                .param(element_locator())
                .param(ParamSchema::text("value", "Option value").required()),
            StepDefinition::new(StepType::Checkbox, "Checkbox", "Check or uncheck a checkbox")
                .defaults(json!({ "locator": empty_locator(), "checked": true }))
                .param(element_locator())
                .param(ParamSchema::checkbox("checked", "Checked").default_value(true)),
            element_step(StepType::Radio, "Radio", "Select a radio button"),
        ],
    )
}

fn assertion() -> StepCategory {
    StepCategory::new(
        "assertion",
        "Assertions",
        vec![
            StepDefinition::new(
                StepType::AssertText,
                "Assert text",
                "Check that the page or an element contains a text",
            )
            .defaults(json!({ "locator": empty_locator(), "text": "" }))
            .param(
                ParamSchema::locator("locator", "Element locator (optional)")
                    .describe("Leave empty to search the whole page"),
            )
            .param(ParamSchema::text("text", "Expected text").required()),
            element_step(
                StepType::AssertElement,
                "Assert element",
                "Check that an element exists",
            ),
            element_step(
                StepType::AssertVisible,
                "Assert visible",
                "Check that an element is visible",
            ),
            StepDefinition::new(
                StepType::AssertEnabled,
                "Assert enabled",
                "Check whether an element is enabled",
            )
            .defaults(json!({ "locator": empty_locator(), "enabled": true }))
            .param(element_locator())
            .param(
                ParamSchema::select(
                    "enabled",
                    "Expected state",
                    vec![
                        SelectOption::new("Enabled", true),
                        SelectOption::new("Disabled", false),
                    ],
                )
                .required(),
            ),
            StepDefinition::new(StepType::AssertTitle, "Assert title", "Check the page title")
                .defaults(json!({ "expected": "" }))
                .param(ParamSchema::text("expected", "Expected title").required()),
            StepDefinition::new(StepType::AssertUrl, "Assert URL", "Check the current page URL")
                .defaults(json!({ "expected": "" }))
                .param(
                    ParamSchema::text("expected", "Expected URL")
                        .required()
                        .placeholder("https://example.com/page"),
                ),
        ],
    )
}

fn wait() -> StepCategory {
    StepCategory::new(
        "wait",
        "Wait",
        vec![
            fixed_wait(false),
            StepDefinition::new(
                StepType::WaitElement,
                "Wait for element",
                "Wait until an element appears",
            )
            .defaults(json!({ "locator": empty_locator(), "timeout": 10 }))
            .param(element_locator())
            .param(
                ParamSchema::number("timeout", "Timeout (s)")
                    .default_value(10)
                    .min(1.0),
            ),
            StepDefinition::new(
                StepType::WaitText,
                "Wait for text",
                "Wait until a text appears on the page or in an element",
            )
            .defaults(json!({ "locator": empty_locator(), "text": "", "timeout": 10 }))
            .param(
                ParamSchema::locator("locator", "Element locator (optional)")
                    .describe("Leave empty to search the whole page"),
            )
            .param(ParamSchema::text("text", "Text").required())
            .param(
                ParamSchema::number("timeout", "Timeout (s)")
                    .default_value(10)
                    .min(1.0),
            ),
        ],
    )
}

fn window() -> StepCategory {
    StepCategory::new(
        "window",
        "Windows and frames",
        vec![
            StepDefinition::new(
                StepType::SwitchWindow,
                "Switch window",
                "Switch to another window",
            )
            .defaults(json!({ "switch_type": "window", "name_or_index": "" }))
            .param(
                ParamSchema::text("name_or_index", "Window name or index")
                    .required()
                    .placeholder("window name or numeric index"),
            ),
            StepDefinition::new(StepType::SwitchFrame, "Switch frame", "Switch into an iframe")
                .defaults(json!({ "switch_type": "frame", "name_or_index": "" }))
                .param(
                    ParamSchema::text("name_or_index", "Frame name or index")
                        .required()
                        .placeholder("iframe name or numeric index"),
                ),
            StepDefinition::new(
                StepType::SwitchDefault,
                "Switch to main document",
                "Leave all frames",
            )
            .defaults(json!({ "switch_type": "default" })),
            StepDefinition::new(StepType::NewTab, "New tab", "Open a URL in a new tab")
                .defaults(json!({ "url": "" }))
                .param(
                    ParamSchema::text("url", "URL")
                        .format(ParamFormat::Url)
                        .placeholder("https://example.com"),
                ),
            StepDefinition::new(StepType::CloseTab, "Close tab", "Close the current tab"),
        ],
    )
}

fn keyboard() -> StepCategory {
    StepCategory::new(
        "keyboard",
        "Keyboard",
        vec![
            StepDefinition::new(StepType::PressKey, "Press key", "Press a single key")
                .defaults(json!({ "key": "" }))
                .param(
                    ParamSchema::text("key", "Key")
                        .required()
                        .placeholder("ENTER, SPACE, TAB, A-Z"),
                ),
            StepDefinition::new(
                StepType::PressKeys,
                "Key combination",
                "Press a key combination such as Ctrl+A",
            )
            .defaults(json!({ "keys": "" }))
            .param(
                ParamSchema::text("keys", "Keys")
                    .required()
                    .placeholder("CTRL+A, SHIFT+TAB"),
            ),
        ],
    )
}

fn file() -> StepCategory {
    StepCategory::new(
        "file",
        "Files",
        vec![
            StepDefinition::new(StepType::Upload, "Upload file", "Upload a file through an input")
                .defaults(json!({ "locator": empty_locator(), "file_path": "" }))
                .param(ParamSchema::locator("locator", "File input locator").required())
                .param(
                    ParamSchema::text("file_path", "File path")
                        .required()
                        .format(ParamFormat::FilePath)
                        .placeholder("/path/to/file.txt"),
                ),
            StepDefinition::new(StepType::Download, "Download file", "Download and check a file")
                .defaults(json!({ "url": "", "save_path": "", "wait_time": 5 }))
                .param(
                    ParamSchema::text("url", "Download URL")
                        .required()
                        .format(ParamFormat::Url),
                )
                .param(
                    ParamSchema::text("save_path", "Save path")
                        .format(ParamFormat::FilePath)
                        .placeholder("/path/to/save/file.txt"),
                )
                .param(ParamSchema::number("wait_time", "Wait time (s)").default_value(5)),
        ],
    )
}

fn data() -> StepCategory {
    let storage_options = || {
        vec![
            SelectOption::new("LocalStorage", "localStorage"),
            SelectOption::new("SessionStorage", "sessionStorage"),
        ]
    };

    StepCategory::new(
        "data",
        "Data",
        vec![
            StepDefinition::new(StepType::GetCookie, "Get cookie", "Read a cookie value")
                .defaults(json!({ "name": "" }))
                .param(ParamSchema::text("name", "Cookie name").required()),
            StepDefinition::new(StepType::SetCookie, "Set cookie", "Write a cookie")
                .defaults(json!({ "name": "", "value": "", "domain": "", "path": "" }))
                .param(ParamSchema::text("name", "Cookie name").required())
                .param(ParamSchema::text("value", "Cookie value").required())
                .param(ParamSchema::text("domain", "Domain").placeholder("example.com"))
                .param(ParamSchema::text("path", "Path").placeholder("/")),
            StepDefinition::new(
                StepType::GetStorage,
                "Get storage",
                "Read from LocalStorage or SessionStorage",
            )
            .defaults(json!({ "type": "localStorage", "key": "" }))
            .param(ParamSchema::select("type", "Storage", storage_options()).required())
            .param(ParamSchema::text("key", "Key").required()),
            StepDefinition::new(
                StepType::SetStorage,
                "Set storage",
                "Write to LocalStorage or SessionStorage",
            )
            .defaults(json!({ "type": "localStorage", "key": "", "value": "" }))
            .param(ParamSchema::select("type", "Storage", storage_options()).required())
            .param(ParamSchema::text("key", "Key").required())
            .param(ParamSchema::text("value", "Value").required()),
            StepDefinition::new(
                StepType::Extract,
                "Extract data",
                "Extract page data into a variable",
            )
            .defaults(json!({
                "name": "",
                "source": "text",
                "locator": { "type": "", "value": "" },
                "attribute": ""
            }))
            .param(
                ParamSchema::text("name", "Variable name")
                    .required()
                    .format(ParamFormat::Identifier),
            )
            .param(
                ParamSchema::select(
                    "source",
                    "Source",
                    vec![
                        SelectOption::new("Text content", "text"),
                        SelectOption::new("Attribute", "attribute"),
                    ],
                )
                .required(),
            )
            .param(
                ParamSchema::locator("locator", "Element locator").visible_when(
                    VisibleWhen::NotEquals {
                        field: "source",
                        value: json!("text"),
                    },
                ),
            )
            .param(
                ParamSchema::text("attribute", "Attribute name")
                    .placeholder("value, class, id")
                    .visible_when(VisibleWhen::Equals {
                        field: "source",
                        value: json!("attribute"),
                    }),
            ),
        ],
    )
}

fn advanced() -> StepCategory {
    StepCategory::new(
        "advanced",
        "Advanced",
        vec![
            StepDefinition::new(
                StepType::Screenshot,
                "Screenshot",
                "Capture the current page or element",
            )
            .defaults(json!({ "filename": "", "full_page": false }))
            .param(
                ParamSchema::text("filename", "File name")
                    .format(ParamFormat::FilePath)
                    .placeholder("screenshot.png"),
            )
            .param(ParamSchema::checkbox("full_page", "Full page").default_value(false)),
            StepDefinition::new(
                StepType::ExecuteScript,
                "Execute script",
                "Run JavaScript in the page",
            )
            .defaults(json!({ "script": "" }))
            .param(
                ParamSchema::textarea("script", "JavaScript")
                    .required()
                    .placeholder("return document.title;"),
            ),
            StepDefinition::new(
                StepType::ExecuteAsyncScript,
                "Execute async script",
                "Run asynchronous JavaScript in the page",
            )
            .defaults(json!({ "script": "" }))
            .param(ParamSchema::textarea("script", "Async JavaScript").required()),
            StepDefinition::new(
                StepType::DragAndDrop,
                "Drag and drop",
                "Drag an element onto another",
            )
            .defaults(json!({
                "source_locator": empty_locator(),
                "target_locator": empty_locator()
            }))
            .param(ParamSchema::locator("source_locator", "Source locator").required())
            .param(ParamSchema::locator("target_locator", "Target locator").required()),
        ],
    )
}
