//! Conversion between internal types and the Anthropic wire format

use crate::protocol::anthropic::{HostedMessage, HostedRequest, HostedResponse, HostedResponseBlock};
use crate::types::{ChatParams, ChatResponse, Message, Role};

/// Build a Messages API request
///
/// System messages are lifted into the top-level `system` field, joined by a
/// blank line; the remaining turns keep their order.
pub fn to_hosted_request(model_id: &str, messages: &[Message], params: &ChatParams) -> HostedRequest {
    let mut system_parts = Vec::new();
    let mut turns = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            Role::System => system_parts.push(message.content.as_str()),
            Role::User | Role::Assistant => turns.push(HostedMessage {
                role: message.role.as_str(),
                content: message.content.clone(),
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    HostedRequest {
        model: model_id.to_owned(),
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        system,
        messages: turns,
    }
}

/// Concatenate the text blocks of a reply in order
///
/// A reply without text blocks yields an empty string.
pub fn collect_text(response: &HostedResponse) -> String {
    response
        .content
        .iter()
        .filter_map(|block| match block {
            HostedResponseBlock::Text { text } => Some(text.as_str()),
            HostedResponseBlock::Other => None,
        })
        .collect()
}

impl From<HostedResponse> for ChatResponse {
    fn from(response: HostedResponse) -> Self {
        Self::from_text(collect_text(&response))
    }
}
