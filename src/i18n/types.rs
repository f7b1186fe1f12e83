//! Locale types, application scopes and key normalization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four translation categories, each with its own key namespace.
///
/// Variants are declared in the order of their short codes so that ordered
/// maps keyed by `LocaleType` serialize in the same order as the codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocaleType {
    #[serde(rename = "act")]
    Action,
    #[serde(rename = "err")]
    Error,
    #[serde(rename = "lbl")]
    Label,
    #[serde(rename = "msg")]
    Message,
}

impl LocaleType {
    pub const ALL: [LocaleType; 4] = [
        LocaleType::Action,
        LocaleType::Error,
        LocaleType::Label,
        LocaleType::Message,
    ];

    /// Short code as stored in the database, also used as placeholder prefix.
    pub fn code(&self) -> &'static str {
        match self {
            LocaleType::Action => "act",
            LocaleType::Error => "err",
            LocaleType::Label => "lbl",
            LocaleType::Message => "msg",
        }
    }
}

impl fmt::Display for LocaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LocaleType {
    type Err = String;

    /// Accepts both the short code and the long name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "act" | "action" => Ok(LocaleType::Action),
            "err" | "error" => Ok(LocaleType::Error),
            "lbl" | "label" => Ok(LocaleType::Label),
            "msg" | "message" => Ok(LocaleType::Message),
            other => Err(format!("Unknown locale type: '{}'", other)),
        }
    }
}

/// Which translation set a cache belongs to. Backend caches keep the module
/// level in their JSON artifact, frontend caches are flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    Backend,
    Frontend,
}

impl Application {
    pub const ALL: [Application; 2] = [Application::Backend, Application::Frontend];

    pub fn as_str(&self) -> &'static str {
        match self {
            Application::Backend => "backend",
            Application::Frontend => "frontend",
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Application::Backend)
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Application {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backend" => Ok(Application::Backend),
            "frontend" => Ok(Application::Frontend),
            other => Err(format!("Unknown application: '{}'", other)),
        }
    }
}

/// Normalize a translation key to the CamelCase form keys are stored in.
///
/// The key is split on underscores and the first character of every part is
/// upper-cased; the rest of each part is kept as is.
/// `"some_label"` and `"SomeLabel"` both become `"SomeLabel"`.
pub fn to_camel_case(key: &str) -> String {
    let mut result = String::with_capacity(key.len());

    for part in key.split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }

    result
}

/// Upper-case the first character of a string.
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
