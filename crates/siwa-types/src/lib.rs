//! Shared types and error types for the Sign in with Apple flow

pub mod errors;
pub mod session;

pub use errors::{AuthError, AuthResult};
pub use session::Session;
