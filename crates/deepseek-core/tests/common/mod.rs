#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use deepseek_core::{ApiClient, ChatClient, CredentialStore, ModelClass, Session};

pub const EMAIL: &str = "someone@example.com";
pub const PASSWORD: &str = "hunter2";

/// Unsigned JWT whose `exp` is `minutes` from now
pub fn token_expiring_in(minutes: i64) -> String {
    let exp = (Utc::now() + Duration::minutes(minutes)).timestamp();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "42", "exp": exp }).to_string());
    format!("{}.{}.sig", header, payload)
}

pub fn login_body(token: &str) -> Value {
    json!({
        "code": 0,
        "msg": "",
        "data": {
            "user": {
                "id": "42",
                "email": EMAIL,
                "token": token
            }
        }
    })
}

pub fn login_request() -> Value {
    json!({ "email": EMAIL, "mobile": "", "password": PASSWORD, "area_code": "" })
}

/// Mock a login that answers with `token`, expecting `times` calls
pub fn login_mock(token: &str, times: u64) -> Mock {
    Mock::given(method("POST"))
        .and(path("/api/v0/users/login"))
        .and(body_json(login_request()))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(token)))
        .expect(times)
}

pub struct Harness {
    pub server: MockServer,
    pub dir: TempDir,
}

impl Harness {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::with_base_url(format!("{}/api/v0", self.server.uri())).unwrap()
    }

    pub fn store(&self) -> CredentialStore {
        CredentialStore::new(self.dir.path().join("login.json"))
    }

    pub fn session(&self) -> Session {
        Session::new(self.store())
    }

    pub fn chat(&self) -> ChatClient {
        ChatClient::new(self.api(), self.session(), ModelClass::DeepseekCode)
    }
}
