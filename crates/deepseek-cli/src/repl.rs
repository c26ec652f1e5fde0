//! Interactive prompt loop.

use std::io::{self, Write};

use anyhow::Result;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

use deepseek_core::ChatClient;

const USAGE: &str = "
  Usage:
    - Type 'new' to start a new chat.
    - Type '/clear' to clear the screen.
    - Type 'exit' to exit.

  Start chatting!
";

/// ANSI: cursor home, clear to end of screen
const CLEAR_SCREEN: &str = "\x1b[H\x1b[J";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Exit,
    NewChat,
    Clear,
    Empty,
    Message(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Input::Empty,
            "exit" => Input::Exit,
            "new" | "/new" => Input::NewChat,
            "/clear" => Input::Clear,
            message => Input::Message(message),
        }
    }
}

pub async fn run(chat: &mut ChatClient) -> Result<()> {
    println!("{}", USAGE);
    println!("  Model: {}\n", chat.model_class());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        // EOF or Ctrl+C at the prompt
        let Some(line) = line else {
            println!();
            break;
        };

        match Input::parse(&line) {
            Input::Exit => break,
            Input::Empty => continue,
            Input::Clear => {
                print!("{}", CLEAR_SCREEN);
                io::stdout().flush()?;
            }
            Input::NewChat => match chat.reset_context().await {
                Ok(response) => {
                    debug!(%response, "Context cleared");
                    println!("New chat started...");
                }
                Err(e) => report(&e),
            },
            Input::Message(text) => {
                if let Err(e) = stream_reply(chat, text).await {
                    println!();
                    report(&e);
                }
            }
        }
    }

    Ok(())
}

/// Print a reply as it streams in. Ctrl+C drops the stream, which closes
/// the connection and abandons the rest of the reply.
async fn stream_reply(chat: &mut ChatClient, text: &str) -> deepseek_core::Result<()> {
    let mut stream = chat.send_message(text).await?;
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            delta = stream.next() => match delta {
                Some(delta) => {
                    let delta = delta?;
                    write!(stdout, "{}", delta.content)?;
                    stdout.flush()?;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n[reply cancelled]");
                return Ok(());
            }
        }
    }

    println!();
    Ok(())
}

fn report(e: &deepseek_core::ApiError) {
    error!(error = %e, "Request failed");
    eprintln!("Error: {}", e);
    if e.is_unauthorized() {
        eprintln!("The server rejected the saved token; restart with --logout to log in again.");
    }
}
