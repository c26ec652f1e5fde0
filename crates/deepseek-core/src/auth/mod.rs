//! Authentication module for managing the login session and credentials.
//!
//! This module provides:
//! - `Session`: bearer token lifecycle with expiry-driven refresh
//! - `CredentialStore`: the login response persisted as a local JSON file
//!
//! Tokens are refreshed one hour before their `exp` claim, checked inline
//! before every authenticated call.

pub mod credentials;
pub mod session;
pub mod token;

pub use credentials::{CredentialStore, Credentials};
pub use session::{ActiveToken, Session, SessionState};
