use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Backend model a conversation is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelClass {
    #[default]
    DeepseekCode,
    DeepseekChat,
}

impl ModelClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelClass::DeepseekCode => "deepseek_code",
            ModelClass::DeepseekChat => "deepseek_chat",
        }
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "deepseek_code" | "code" => Ok(ModelClass::DeepseekCode),
            "deepseek_chat" | "chat" => Ok(ModelClass::DeepseekChat),
            other => Err(format!(
                "unknown model class '{}' (expected deepseek_code or deepseek_chat)",
                other
            )),
        }
    }
}

/// One fragment of a streamed chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatDelta {
    pub content: String,
    /// Set on the fragment that ends the assistant's turn
    pub finished: bool,
}

impl ChatDelta {
    pub fn new(content: impl Into<String>, finished: bool) -> Self {
        Self {
            content: content.into(),
            finished,
        }
    }
}
