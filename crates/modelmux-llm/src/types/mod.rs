//! Provider-agnostic request and response types

pub mod message;
pub mod request;
pub mod response;
pub mod tags;

pub use message::{Message, Role};
pub use request::ChatParams;
pub use response::{ChatResponse, Choice, ChoiceMessage};
pub use tags::TagSet;
