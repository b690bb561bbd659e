//! Interactive chat against a hosted agent runtime.
//!
//! Every line typed is sent as one turn of the same conversation, so the
//! agent remembers earlier turns. Text is printed as it streams in and tool
//! invocations are announced once each.
//!
//! Run with:
//! ```bash
//! AGENTCORE_RUNTIME_ARN=arn:aws:bedrock-agentcore:... AWS_REGION=us-east-1 \
//!     cargo run --example agent_chat
//! ```

use agentstream::prelude::*;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = RuntimeConfig::from_env()?;
    println!("Connected to {}", config.runtime_arn);
    println!("Type a message, or an empty line to quit.\n");

    let client = AgentRuntimeClient::from_config(config)?;
    let conversation = "agent-chat-demo";

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }

        let callbacks = StreamCallbacks::new()
            .with_text_chunk(|text| {
                print!("{}", text);
                let _ = io::stdout().flush();
            })
            .with_tool_use(|name| println!("\n[tool] {}", name))
            .with_error(|err| eprintln!("\n[error] {}", err));

        match client.invoke(conversation, line.trim(), callbacks).await {
            Ok(answer) => println!("\n({} chars)\n", answer.chars().count()),
            Err(err) if err.is_retryable() => {
                eprintln!("Temporary failure, starting a fresh session: {}", err);
                client.sessions().evict(conversation);
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(session) = client.sessions().get(conversation) {
        println!("Runtime session: {}", session.runtime_session_id);
    }
    Ok(())
}
