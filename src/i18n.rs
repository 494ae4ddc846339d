//! message language selection
//!
//! every message raised by the engine exists in Chinese and English. the
//! language is chosen per call (through `EvalContext` or `Engine`), never
//! through process-wide state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// language used for error and diagnostic text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
pub enum Language {
    /// simplified Chinese, the historical default
    #[default]
    #[serde(rename = "zh-cn")]
    #[value(name = "zh-cn")]
    ZhCn,
    /// US English
    #[serde(rename = "en-us")]
    #[value(name = "en-us")]
    EnUs,
}

/// every supported language tag
pub const LANGUAGES: [&str; 2] = ["zh-cn", "en-us"];

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::ZhCn => "zh-cn",
            Language::EnUs => "en-us",
        }
    }

    /// pick the text matching this language
    pub fn text(self, zh: impl Into<String>, en: impl Into<String>) -> String {
        match self {
            Language::ZhCn => zh.into(),
            Language::EnUs => en.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh-cn" => Ok(Language::ZhCn),
            "en-us" => Ok(Language::EnUs),
            other => Err(format!(
                "language '{}' is not supported, expected one of: {}",
                other,
                LANGUAGES.join(", ")
            )),
        }
    }
}
