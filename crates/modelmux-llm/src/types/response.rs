use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized result returned by every backend
///
/// Fields beyond `choices[].message.{role, content}` are kept verbatim so a
/// local reply passes through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// `null` when the backend produced no text (e.g. a pure tool call)
    #[serde(default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatResponse {
    /// Wrap a single assistant reply in the normalized shape
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    role: Some("assistant".to_owned()),
                    content: Some(text.into()),
                    extra: Map::new(),
                },
                extra: Map::new(),
            }],
            extra: Map::new(),
        }
    }

    /// Content of the first choice, the value downstream callers read
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}
