use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Mobile,
    Api,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Web, Platform::Mobile, Platform::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Mobile => "mobile",
            Platform::Api => "api",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Web => "Web automation",
            Platform::Mobile => "Mobile automation",
            Platform::Api => "API testing",
        }
    }

    pub fn frameworks(&self) -> &'static [Framework] {
        match self {
            Platform::Web => &[Framework::Selenium, Framework::Playwright],
            Platform::Mobile => &[Framework::Appium],
            Platform::Api => &[Framework::Httprunner],
        }
    }

    pub fn default_framework(&self) -> Framework {
        self.frameworks()[0]
    }

    pub fn supports(&self, framework: Framework) -> bool {
        self.frameworks().contains(&framework)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}' (expected web, mobile or api)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|platform| platform.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Selenium,
    Playwright,
    Appium,
    Httprunner,
}

impl Framework {
    pub const ALL: [Framework; 4] = [
        Framework::Selenium,
        Framework::Playwright,
        Framework::Appium,
        Framework::Httprunner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Selenium => "selenium",
            Framework::Playwright => "playwright",
            Framework::Appium => "appium",
            Framework::Httprunner => "httprunner",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Framework::Selenium => "Selenium",
            Framework::Playwright => "Playwright",
            Framework::Appium => "Appium",
            Framework::Httprunner => "HttpRunner",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown framework '{0}'")]
pub struct UnknownFramework(pub String);

impl FromStr for Framework {
    type Err = UnknownFramework;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Framework::ALL
            .iter()
            .copied()
            .find(|framework| framework.as_str() == s)
            .ok_or_else(|| UnknownFramework(s.to_string()))
    }
}
