//! Wire format types for each backend protocol

pub mod anthropic;
pub mod openai;
