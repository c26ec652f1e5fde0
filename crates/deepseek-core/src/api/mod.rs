//! REST API client module for coder.deepseek.com.
//!
//! This module provides the `ApiClient` for the login, registration,
//! clear-context and streaming completion endpoints, the `ApiError`
//! taxonomy shared by the whole crate, and the decoder for the
//! line-framed completion stream.
//!
//! The API uses JWT bearer token authentication obtained from the
//! `/users/login` endpoint.

pub mod client;
pub mod error;
pub mod stream;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use stream::{decode_frame, decode_stream};
