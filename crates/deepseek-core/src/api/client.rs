//! HTTP client for the coder.deepseek.com private API.
//!
//! This module provides the `ApiClient` struct, a thin wrapper that shapes
//! request bodies, attaches the browser-like headers the web frontend sends,
//! and maps non-success statuses to `ApiError`. It holds no session state:
//! authenticated calls take the authorization headers from the caller.

use std::time::Duration;

use futures::Stream;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::stream::decode_stream;
use crate::auth::Credentials;
use crate::models::{
    ChatDelta, ClearContextRequest, CompletionRequest, LoginRequest, ModelClass, RegisterRequest,
    VerificationCodeRequest,
};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for all API endpoints
pub const DEFAULT_BASE_URL: &str = "https://coder.deepseek.com/api/v0";

/// Origin of the web frontend the headers impersonate
const SITE_ORIGIN: &str = "https://coder.deepseek.com";

/// Frontend build the server expects to be talking to
const APP_VERSION: &str = "20231220.2";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome";

const SEC_CH_UA: &str = r#""Google Chrome";v="119", "Chromium";v="119", "Not?A_Brand";v="24""#;

/// Timeout for one-shot JSON calls (login, clear context, registration)
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Total timeout for a streamed completion, long answers included
const STREAM_TIMEOUT_SECS: u64 = 300;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// The web frontend only ever uses conversation slot 1
const SESSION_ID: &str = "1";

/// API client for coder.deepseek.com.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the public service
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against another deployment (or a test server)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::browser_headers())
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers the web frontend sends with every request
    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-IN,en;q=0.9"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(header::ORIGIN, HeaderValue::from_static(SITE_ORIGIN));
        headers.insert(header::REFERER, HeaderValue::from_static("https://coder.deepseek.com/"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("empty"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("cors"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-origin"),
        );
        headers.insert(HeaderName::from_static("sec-ch-ua"), HeaderValue::from_static(SEC_CH_UA));
        headers.insert(
            HeaderName::from_static("sec-ch-ua-mobile"),
            HeaderValue::from_static("?0"),
        );
        headers.insert(
            HeaderName::from_static("sec-ch-ua-platform"),
            HeaderValue::from_static("\"Linux\""),
        );
        headers.insert(
            HeaderName::from_static("x-app-version"),
            HeaderValue::from_static(APP_VERSION),
        );
        headers
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Request rejected by server");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Value> {
        debug!(url = url, "POST");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .query(query)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    // ===== Authentication =====

    /// Exchange email and password for a fresh set of credentials
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }

        let url = self.url("/users/login");
        debug!(url = %url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::REFERER, "https://coder.deepseek.com/sign_in")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&LoginRequest::new(email, password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::login_failed(status, &body));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ApiError::RemoteLogin(format!("unreadable login response: {}", e)))?;
        let credentials = Credentials::new(raw);

        if credentials.token().is_none() {
            // Wrong passwords come back as 200 with an error message in the body
            let message = credentials
                .as_json()
                .get("msg")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("response did not contain a token");
            return Err(ApiError::RemoteLogin(message.to_string()));
        }

        Ok(credentials)
    }

    /// Ask the server to email a verification code for account registration
    pub async fn create_email_verification_code(&self, email: &str) -> Result<Value> {
        if email.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }
        let url = self.url("/users/create_email_verification_code");
        self.post_json(&url, HeaderMap::new(), &[], &VerificationCodeRequest::new(email))
            .await
    }

    /// Register a new account with the emailed verification code
    pub async fn register(
        &self,
        email: &str,
        email_verification_code: &str,
        password: &str,
    ) -> Result<Value> {
        if email.is_empty() || password.is_empty() || email_verification_code.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }
        let url = self.url("/users/register");
        let body = RegisterRequest::new(email, email_verification_code, password);
        self.post_json(&url, HeaderMap::new(), &[], &body).await
    }

    // ===== Chat =====

    /// Reset the server-side conversation
    pub async fn clear_context(&self, auth: &HeaderMap, model_class: ModelClass) -> Result<Value> {
        let url = self.url("/chat/clear_context");
        self.post_json(
            &url,
            auth.clone(),
            &[("session_id", SESSION_ID)],
            &ClearContextRequest::new(model_class),
        )
        .await
    }

    /// Send a message and stream the reply.
    ///
    /// Resolves once the response headers arrive; the body is decoded lazily
    /// as the caller polls the returned stream. Dropping the stream closes
    /// the connection.
    pub async fn completions(
        &self,
        auth: &HeaderMap,
        message: &str,
        model_class: ModelClass,
    ) -> Result<impl Stream<Item = Result<ChatDelta>> + Send + 'static> {
        let url = self.url("/chat/completions");
        debug!(url = %url, model_class = %model_class, "Opening completion stream");

        let response = self
            .client
            .post(&url)
            .headers(auth.clone())
            .header(header::REFERER, "https://coder.deepseek.com/chat")
            .timeout(Duration::from_secs(STREAM_TIMEOUT_SECS))
            .json(&CompletionRequest::new(message, model_class))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(decode_stream(response.bytes_stream()))
    }
}
