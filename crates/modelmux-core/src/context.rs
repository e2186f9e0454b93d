use serde::{Deserialize, Serialize};

/// Custom JWT claims issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    #[serde(rename = "sub")]
    pub subject: String,
}
