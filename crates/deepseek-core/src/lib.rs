//! Core library for deepseek-chat.
//!
//! An unofficial client for the coder.deepseek.com chat service:
//!
//! - `api`: HTTP client, error type and completion stream decoding
//! - `auth`: credential file, JWT expiry and the login session
//! - `chat`: `ChatClient`, the authenticated chat transport
//! - `models`: request bodies, `ModelClass`, `ChatDelta`
//! - `config`: persisted user preferences

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, Result};
pub use auth::{ActiveToken, CredentialStore, Credentials, Session, SessionState};
pub use chat::{ChatClient, ChatStream};
pub use config::Config;
pub use models::{ChatDelta, ModelClass};
