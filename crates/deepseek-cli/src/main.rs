//! deepseek-chat - a terminal chat client for coder.deepseek.com.
//!
//! Logs in (or reuses a saved login), then runs a prompt loop that streams
//! each reply to stdout as it arrives.

mod register;
mod repl;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deepseek_core::{
    ApiClient, ChatClient, Config, CredentialStore, ModelClass, Session, SessionState,
};

/// Log file written inside the cache directory
const LOG_FILE: &str = "deepseek-chat.log";

#[derive(Debug, Parser)]
#[command(name = "deepseek-chat", version, about = "Chat with coder.deepseek.com from the terminal")]
struct Cli {
    /// Account email
    #[arg(long, env = "DEEPSEEK_EMAIL")]
    email: Option<String>,

    /// Account password (prompted for if not set)
    #[arg(long, env = "DEEPSEEK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Model class: deepseek_code or deepseek_chat
    #[arg(long)]
    model: Option<ModelClass>,

    /// Do not read or write the saved login
    #[arg(long)]
    no_save: bool,

    /// Delete the saved login and exit
    #[arg(long)]
    logout: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new account (an email verification code is sent first)
    Register {
        #[arg(long)]
        email: Option<String>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file so they never interleave with streamed replies; stderr
/// is the fallback when the cache directory is unavailable.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok());
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

/// Print a label and read one trimmed line from stdin
pub(crate) fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn resolve_email(explicit: Option<String>, config: &Config) -> Result<String> {
    if let Some(email) = explicit.filter(|e| !e.is_empty()) {
        return Ok(email);
    }
    match config.last_email {
        Some(ref last) => {
            let input = prompt_line(&format!("Email [{}]: ", last))?;
            Ok(if input.is_empty() { last.clone() } else { input })
        }
        None => prompt_line("Email: "),
    }
}

/// Status line for a restored login
fn saved_login_notice(minutes_left: i64) -> String {
    if minutes_left == 0 {
        return "Using saved login (token expired, renewing on first request)".to_string();
    }
    format!(
        "Using saved login (token valid for {}h {:02}m)",
        minutes_left / 60,
        minutes_left % 60
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_result = Config::load();
    let mut config = config_result.as_ref().cloned().unwrap_or_default();

    let _guard = init_tracing(config.cache_dir().ok().as_deref());
    if let Err(e) = config_result {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!("deepseek-chat starting");

    let api = ApiClient::with_base_url(config.api_base_url())?;
    let store = CredentialStore::new(config.credentials_path()?);
    let mut session = Session::new(store);

    if cli.logout {
        session.logout().context("Failed to remove saved login")?;
        println!("Saved login removed.");
        return Ok(());
    }

    if let Some(Command::Register { email }) = cli.command {
        return register::run(&api, email.or(cli.email)).await;
    }

    let email = resolve_email(cli.email, &config)?;
    let password = match cli.password.filter(|p| !p.is_empty()) {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    let persist = config.save_login && !cli.no_save;
    let model_class = cli.model.unwrap_or(config.model_class);

    if persist {
        match session.restore(&email, &password) {
            Ok(true) => {
                if let SessionState::LoggedIn(active) = session.state() {
                    let minutes_left = active.minutes_until_expiry();
                    info!(minutes_left, "Using saved login");
                    println!("{}", saved_login_notice(minutes_left));
                }
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Ignoring saved login");
                eprintln!("Saved login is unusable ({}), logging in again", e);
            }
        }
    }

    let mut chat = ChatClient::new(api, session, model_class);
    if !chat.session().is_logged_in() {
        chat.login(&email, &password, persist)
            .await
            .context("Login failed")?;
    }

    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    let result = repl::run(&mut chat).await;

    info!("deepseek-chat shutting down");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_login_notice() {
        assert_eq!(
            saved_login_notice(125),
            "Using saved login (token valid for 2h 05m)"
        );
        assert_eq!(
            saved_login_notice(59),
            "Using saved login (token valid for 0h 59m)"
        );
        assert!(saved_login_notice(0).contains("expired"));
    }
}
