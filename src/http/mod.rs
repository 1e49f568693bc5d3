//! Outbound HTTP: one request per call, classified into success,
//! HTTP error, transport error or local construction error.

mod auth;
mod dispatcher;
mod models;

pub use auth::{AuthToken, Authenticator};
pub use dispatcher::Dispatcher;
pub use models::*;
