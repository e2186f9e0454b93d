use modelmux_config::DispatchConfig;

/// Generation parameters forwarded on every backend call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for ChatParams {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}
