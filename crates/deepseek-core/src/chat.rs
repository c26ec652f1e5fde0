//! Chat transport: authenticated calls on top of a `Session`.
//!
//! Every call first runs `Session::ensure_fresh`, so an expiring token is
//! renewed before the request goes out.

use std::pin::Pin;

use futures::Stream;
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, Result};
use crate::auth::Session;
use crate::models::{ChatDelta, ModelClass};

/// Lazily decoded reply to a single message
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatDelta>> + Send>>;

pub struct ChatClient {
    api: ApiClient,
    session: Session,
    model_class: ModelClass,
}

impl ChatClient {
    pub fn new(api: ApiClient, session: Session, model_class: ModelClass) -> Self {
        Self {
            api,
            session,
            model_class,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn model_class(&self) -> ModelClass {
        self.model_class
    }

    pub fn set_model_class(&mut self, model_class: ModelClass) {
        self.model_class = model_class;
    }

    pub async fn login(&mut self, email: &str, password: &str, persist: bool) -> Result<()> {
        self.session.login(&self.api, email, password, persist).await
    }

    /// Start a fresh conversation on the server
    pub async fn reset_context(&mut self) -> Result<Value> {
        self.session.ensure_fresh(&self.api).await?;
        let headers = self.session.authorized_headers()?;

        debug!(model_class = %self.model_class, "Clearing conversation context");
        self.api.clear_context(&headers, self.model_class).await
    }

    /// Send a message and return its reply as a stream of deltas.
    ///
    /// Each call opens a new connection; dropping the stream cancels the
    /// reply.
    pub async fn send_message(&mut self, text: &str) -> Result<ChatStream> {
        self.session.ensure_fresh(&self.api).await?;
        let headers = self.session.authorized_headers()?;

        let stream = self.api.completions(&headers, text, self.model_class).await?;
        Ok(Box::pin(stream))
    }
}
