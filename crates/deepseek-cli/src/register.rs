//! Account registration: request an emailed code, then register with it.

use anyhow::{Context, Result};
use tracing::info;

use deepseek_core::ApiClient;

use crate::prompt_line;

pub async fn run(api: &ApiClient, email: Option<String>) -> Result<()> {
    let email = match email.filter(|e| !e.is_empty()) {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let response = api
        .create_email_verification_code(&email)
        .await
        .context("Failed to request a verification code")?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    let code = prompt_line("Email verification code: ")?;
    let response = api
        .register(&email, &code, &password)
        .await
        .context("Registration failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    info!("Registration request completed");
    Ok(())
}
