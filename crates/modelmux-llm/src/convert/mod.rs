//! Conversion between internal types and backend wire formats

pub mod anthropic;
