//! Username/password accounts and bearer tokens for modelmux

#![allow(clippy::must_use_candidate)]

mod error;
pub mod password;
mod service;
mod token;
mod users;

pub use error::AuthError;
pub use service::AuthService;
pub use token::{AccessToken, TokenIssuer};
pub use users::{NewUser, User, UserStore};
