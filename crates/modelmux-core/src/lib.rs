//! Shared primitives for modelmux crates
//!
//! Kept free of web-framework types so domain crates can describe their
//! errors and request identity without depending on axum.

#![allow(clippy::must_use_candidate)]

mod context;
mod error;

pub use context::Claims;
pub use error::HttpError;
