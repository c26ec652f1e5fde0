//! JSON request bodies, field-for-field what the web frontend sends.

use serde::Serialize;

use super::ModelClass;

/// Locale reported by the registration endpoints
const LOCALE: &str = "en_US";

/// Region reported on registration
const REGION: &str = "IN";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub mobile: &'a str,
    pub password: &'a str,
    pub area_code: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn new(email: &'a str, password: &'a str) -> Self {
        Self {
            email,
            mobile: "",
            password,
            area_code: "",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearContextRequest {
    pub model_class: ModelClass,
    pub append_welcome_message: bool,
}

impl ClearContextRequest {
    pub fn new(model_class: ModelClass) -> Self {
        Self {
            model_class,
            append_welcome_message: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub message: &'a str,
    pub stream: bool,
    pub model_class: ModelClass,
    pub model_preference: Option<String>,
    pub temperature: u32,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(message: &'a str, model_class: ModelClass) -> Self {
        Self {
            message,
            stream: true,
            model_class,
            model_preference: None,
            temperature: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationCodeRequest<'a> {
    pub email: &'a str,
    pub locale: &'a str,
}

impl<'a> VerificationCodeRequest<'a> {
    pub fn new(email: &'a str) -> Self {
        Self {
            email,
            locale: LOCALE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload<'a> {
    pub email: &'a str,
    pub email_verification_code: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub locale: &'a str,
    pub region: &'a str,
    pub payload: RegisterPayload<'a>,
}

impl<'a> RegisterRequest<'a> {
    pub fn new(email: &'a str, email_verification_code: &'a str, password: &'a str) -> Self {
        Self {
            locale: LOCALE,
            region: REGION,
            payload: RegisterPayload {
                email,
                email_verification_code,
                password,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_shape() {
        let body = serde_json::to_value(LoginRequest::new("a@b.c", "pw")).unwrap();
        assert_eq!(
            body,
            json!({"email": "a@b.c", "mobile": "", "password": "pw", "area_code": ""})
        );
    }

    #[test]
    fn test_completion_request_sends_null_preference() {
        let body =
            serde_json::to_value(CompletionRequest::new("hi", ModelClass::DeepseekChat)).unwrap();
        assert_eq!(
            body,
            json!({
                "message": "hi",
                "stream": true,
                "model_class": "deepseek_chat",
                "model_preference": null,
                "temperature": 0
            })
        );
    }

    #[test]
    fn test_clear_context_request_shape() {
        let body = serde_json::to_value(ClearContextRequest::new(ModelClass::DeepseekCode)).unwrap();
        assert_eq!(
            body,
            json!({"model_class": "deepseek_code", "append_welcome_message": false})
        );
    }

    #[test]
    fn test_register_request_nests_payload() {
        let body = serde_json::to_value(RegisterRequest::new("a@b.c", "123456", "pw")).unwrap();
        assert_eq!(body["locale"], "en_US");
        assert_eq!(body["region"], "IN");
        assert_eq!(body["payload"]["email_verification_code"], "123456");
    }
}
