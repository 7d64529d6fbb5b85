//! manugenctl - Control CLI for the Manugen backend
//!
//! Drives the agent apps from the terminal: health checks, capitalizer
//! runs, streamed science-writer drafts, and session management.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manugen_client::adk::{Attachment, Session};
use manugen_client::{ClientConfig, DraftRequest, ManugenClient, WRITER_APP};

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "Error: {err:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.client_config()?;
    let client = ManugenClient::new(&config)?;
    let user = cli.user.clone();
    let session = cli.session_id();
    let json = cli.json;

    match cli.command {
        Command::Status => handle_status(&client, json).await,
        Command::Capitalize { text } => handle_capitalize(&client, &user, &session, &text, json).await,
        Command::Draft {
            instructions,
            files,
        } => handle_draft(&client, &user, &session, &instructions, &files, json).await,
        Command::Session { command } => handle_session(&client, command, &user, &session, json).await,
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "manugenctl",
    author,
    version,
    about = "Control CLI for the Manugen agent backend."
)]
struct Cli {
    /// Backend base URL (default http://localhost:8000)
    #[arg(long, env = "MANUGEN_API")]
    api_url: Option<String>,

    /// Optional TOML config file; --api-url overrides its base URL
    #[arg(long, env = "MANUGEN_CONFIG")]
    config: Option<PathBuf>,

    /// User id that scopes sessions
    #[arg(long, default_value = "local", env = "MANUGEN_USER")]
    user: String,

    /// Session id; generated when omitted
    #[arg(long, env = "MANUGEN_SESSION")]
    session: Option<String>,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check backend health
    Status,

    /// Capitalize text via the capitalizer agent
    Capitalize {
        /// Text to capitalize
        text: String,
    },

    /// Stream a science-writer draft
    Draft {
        /// Instructions for the writer
        instructions: String,
        /// Attach a text file (repeatable)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,
    },

    /// Manage sessions
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// List sessions for an app
    List {
        /// App name
        #[arg(default_value = WRITER_APP)]
        app: String,
    },
    /// Fetch a session without creating it
    Get {
        /// App name
        #[arg(default_value = WRITER_APP)]
        app: String,
    },
    /// Create a session, or fetch it when it already exists
    Create {
        /// App name
        #[arg(default_value = WRITER_APP)]
        app: String,
    },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        Ok(config)
    }

    fn session_id(&self) -> String {
        self.session
            .clone()
            .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()))
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "manugen_client=debug,manugenctl=debug"
    } else {
        "manugen_client=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn handle_status(client: &ManugenClient, json: bool) -> Result<()> {
    let healthy = client.health().await?;
    if json {
        println!(r#"{{"healthy": {}}}"#, healthy);
    } else if healthy {
        println!("Backend is healthy");
    } else {
        println!("Backend answered but reported unhealthy");
    }
    Ok(())
}

async fn handle_capitalize(
    client: &ManugenClient,
    user: &str,
    session: &str,
    text: &str,
    json: bool,
) -> Result<()> {
    let result = client.capitalize(user, session, text).await?;
    if json {
        println!("{}", serde_json::json!({ "text": result }));
    } else {
        println!("{}", result);
    }
    Ok(())
}

async fn handle_draft(
    client: &ManugenClient,
    user: &str,
    session: &str,
    instructions: &str,
    files: &[PathBuf],
    json: bool,
) -> Result<()> {
    let mut attachments = Vec::new();
    for path in files {
        attachments.push(read_attachment(path)?);
    }

    let request = DraftRequest {
        instructions: instructions.to_string(),
        attachments,
    };

    let outcome = client
        .draft(user, session, &request, |fragment, log| {
            if let Some(agent) = fragment.transfer_to_agent() {
                let _ = writeln!(io::stderr(), "[{:>3}] handed off to {}", log.len(), agent);
            }
        })
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "text": outcome.text, "state": outcome.state })
        );
    } else {
        println!("{}", outcome.text);
    }
    Ok(())
}

fn read_attachment(path: &Path) -> Result<Attachment> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading attachment {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment")
        .to_string();
    let mime_type = mime_guess::from_path(path).first_or_text_plain().to_string();

    Ok(Attachment {
        filename,
        mime_type,
        data,
    })
}

async fn handle_session(
    client: &ManugenClient,
    command: SessionCommand,
    user: &str,
    session: &str,
    json: bool,
) -> Result<()> {
    match command {
        SessionCommand::List { app } => {
            let sessions = client.sessions().list(&app, user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                println!("{:<32} {:<24} {:<8}", "ID", "APP", "EVENTS");
                println!("{}", "-".repeat(66));
                for entry in sessions {
                    println!(
                        "{:<32} {:<24} {:<8}",
                        entry.id,
                        entry.app_name,
                        entry.events.len()
                    );
                }
            }
        }
        SessionCommand::Get { app } => {
            let entry = client.sessions().get(&app, user, session).await?;
            print_session(&entry, json)?;
        }
        SessionCommand::Create { app } => {
            let entry = client.ensure_session(&app, user, session).await?;
            print_session(&entry, json)?;
        }
    }
    Ok(())
}

fn print_session(session: &Session, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
    } else {
        println!("Session: {}", session.id);
        println!("  App: {}", session.app_name);
        println!("  User: {}", session.user_id);
        println!("  Events: {}", session.events.len());
        let keys: Vec<&str> = session.state.keys().map(String::as_str).collect();
        println!("  State keys: {}", if keys.is_empty() { "-".to_string() } else { keys.join(", ") });
    }
    Ok(())
}
