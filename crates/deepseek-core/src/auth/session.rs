use chrono::{DateTime, Duration, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use super::{token, CredentialStore, Credentials};
use crate::api::{ApiClient, ApiError, Result};

/// Refresh this many hours before the token's `exp` claim.
const TOKEN_REFRESH_MARGIN_HOURS: i64 = 1;

/// A decoded bearer token and the header derived from it.
#[derive(Debug, Clone)]
pub struct ActiveToken {
    credentials: Credentials,
    authorization: HeaderValue,
    expires_at: DateTime<Utc>,
    refresh_at: DateTime<Utc>,
}

impl ActiveToken {
    pub fn from_credentials(credentials: Credentials) -> Result<Self> {
        let token = credentials.token().ok_or_else(|| {
            ApiError::MalformedCredentials("missing data.user.token".to_string())
        })?;
        let expires_at = token::expiry(token)?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::MalformedCredentials("token is not a valid header value".to_string()))?;
        authorization.set_sensitive(true);

        let refresh_at = expires_at
            .checked_sub_signed(Duration::hours(TOKEN_REFRESH_MARGIN_HOURS))
            .ok_or_else(|| {
                ApiError::MalformedCredentials(format!("token expiry {} out of range", expires_at))
            })?;

        Ok(Self {
            credentials,
            authorization,
            expires_at,
            refresh_at,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn refresh_at(&self) -> DateTime<Utc> {
        self.refresh_at
    }

    /// Check if the token is inside the refresh margin (or already expired)
    pub fn needs_refresh(&self) -> bool {
        Utc::now() >= self.refresh_at
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_minutes().max(0)
    }
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(ActiveToken),
}

/// Login session against the chat service.
///
/// Holds the email and password so the token can be renewed in place;
/// `ensure_fresh` is called before each authenticated request instead of
/// running a background refresh timer.
pub struct Session {
    store: CredentialStore,
    email: String,
    password: String,
    persist: bool,
    state: SessionState,
}

impl Session {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            email: String::new(),
            password: String::new(),
            persist: false,
            state: SessionState::LoggedOut,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    pub fn email(&self) -> Option<&str> {
        match self.state {
            SessionState::LoggedIn(_) => Some(self.email.as_str()),
            SessionState::LoggedOut => None,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match &self.state {
            SessionState::LoggedIn(active) => Some(active.credentials()),
            SessionState::LoggedOut => None,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Log in with email and password, optionally saving the credentials.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
        persist: bool,
    ) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }

        self.email = email.to_string();
        self.password = password.to_string();
        self.persist = persist;
        self.authenticate(api).await
    }

    /// Adopt previously saved credentials without a network call.
    ///
    /// Returns `Ok(false)` if nothing was saved. An expired token is still
    /// adopted; the next `ensure_fresh` renews it with the given password.
    pub fn restore(&mut self, email: &str, password: &str) -> Result<bool> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }

        let Some(credentials) = self.store.load()? else {
            return Ok(false);
        };
        let active = ActiveToken::from_credentials(credentials)?;
        debug!(expires_at = %active.expires_at(), "Restored saved credentials");

        self.email = email.to_string();
        self.password = password.to_string();
        self.persist = true;
        self.state = SessionState::LoggedIn(active);
        Ok(true)
    }

    /// Renew the token if it is within the refresh margin.
    ///
    /// A failed renewal logs the session out and returns the login error.
    pub async fn ensure_fresh(&mut self, api: &ApiClient) -> Result<()> {
        let needs_refresh = match &self.state {
            SessionState::LoggedOut => return Err(ApiError::NotLoggedIn),
            SessionState::LoggedIn(active) => active.needs_refresh(),
        };

        if needs_refresh {
            info!("Token expires soon, logging in again");
            self.authenticate(api).await?;
        }
        Ok(())
    }

    /// Authorization headers for the current token
    pub fn authorized_headers(&self) -> Result<HeaderMap> {
        match &self.state {
            SessionState::LoggedOut => Err(ApiError::NotLoggedIn),
            SessionState::LoggedIn(active) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::AUTHORIZATION, active.authorization.clone());
                Ok(headers)
            }
        }
    }

    /// Forget the token and delete any saved credentials.
    /// There is no server-side logout.
    pub fn logout(&mut self) -> Result<()> {
        self.state = SessionState::LoggedOut;
        self.password.clear();
        self.store.clear()
    }

    async fn authenticate(&mut self, api: &ApiClient) -> Result<()> {
        let active = match api.login(&self.email, &self.password).await {
            Ok(credentials) => ActiveToken::from_credentials(credentials),
            Err(e) => Err(e),
        };

        let active = match active {
            Ok(active) => active,
            Err(e) => {
                self.state = SessionState::LoggedOut;
                warn!(error = %e, "Login failed");
                return Err(e);
            }
        };

        if self.persist {
            if let Err(e) = self.store.save(active.credentials()) {
                warn!(error = %e, "Failed to save credentials");
            }
        }

        info!(expires_at = %active.expires_at(), "Logged in");
        self.state = SessionState::LoggedIn(active);
        Ok(())
    }
}
