//! OpenAI-compatible chat completions wire format

use serde::Serialize;

use crate::types::Message;

/// Request body for `POST {base}/chat/completions`
///
/// Exactly these four fields are sent; replies are read straight into
/// [`ChatResponse`](crate::types::ChatResponse).
#[derive(Debug, Serialize)]
pub struct LocalChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f64,
    pub max_tokens: u32,
}
