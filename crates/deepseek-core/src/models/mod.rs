//! Data models exchanged with the chat service.
//!
//! - `ModelClass`: which backend model a conversation targets
//! - `ChatDelta`: one decoded fragment of a streamed reply
//! - Request bodies for the login, registration, clear-context and
//!   completion endpoints

pub mod chat;
pub mod request;

pub use chat::{ChatDelta, ModelClass};
pub use request::{
    ClearContextRequest, CompletionRequest, LoginRequest, RegisterPayload, RegisterRequest,
    VerificationCodeRequest,
};
