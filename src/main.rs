use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use scholar_cite::agent::{self, ChatAgent};
use scholar_cite::config::{self, Config, DEFAULT_ENV_FILE};
use scholar_cite::mcp::CitationServer;
use scholar_cite::runner;
use scholar_cite::tools::{ToolName, Tools};
use scholar_cite::web::{self, AppState};

const SMOKE_TEST_REQUEST: &str = "search: graph neural networks healthcare 2021";

#[derive(Parser)]
#[command(name = "scholar-cite", version, about = "Academic search & citation assistant")]
struct Cli {
    /// Credential file holding GROQ_API_KEY
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check the credential file, then launch the web UI (default)
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Send one request to the agent and print its reply
    Ask {
        message: Option<String>,
    },
    /// Run one tool directly, without the model
    Tool {
        /// Tool name, e.g. fetch_by_doi
        name: String,
        /// The tool's single argument (query, DOI, or metadata JSON)
        argument: String,
    },
    /// Serve the tools over MCP on stdio
    Mcp,
}

/// Load the credential file when present; the non-UI commands don't require it.
fn load_optional_env(path: &Path) -> anyhow::Result<Config> {
    if path.is_file() {
        config::load_env_file(path)?;
    }
    Config::from_env()
}

async fn serve(env_file: &Path, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    println!("\u{1f393} Academic Search & Citation Manager");
    let mut config = match runner::preflight(env_file, |m| println!("\u{2705} {}", m)) {
        Ok(config) => config,
        Err(e) => {
            println!("\u{274c} {}", e);
            return Ok(());
        }
    };
    if let Some(bind) = bind {
        config.bind = bind;
    }

    let tools = Arc::new(Tools::new(&config)?);
    let agent = ChatAgent::new(&config, tools)?;
    web::serve(config.bind, AppState::new(Arc::new(agent))).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(&cli.env_file, bind).await?,
        Command::Ask { message } => {
            let config = load_optional_env(&cli.env_file)?;
            let tools = Arc::new(Tools::new(&config)?);
            let agent = ChatAgent::new(&config, tools)?;
            let request = message.as_deref().unwrap_or(SMOKE_TEST_REQUEST);
            let reply = agent::ask(&agent, request).await?;
            println!("{}", reply);
        }
        Command::Tool { name, argument } => {
            let tool = ToolName::parse(&name).with_context(|| {
                let known: Vec<_> = ToolName::ALL.iter().map(|t| t.as_str()).collect();
                format!("Unknown tool '{}'. Available: {}", name, known.join(", "))
            })?;
            let config = load_optional_env(&cli.env_file)?;
            let tools = Tools::new(&config)?;
            println!("{}", tools.run(tool, &argument).await.into_text());
        }
        Command::Mcp => {
            let config = load_optional_env(&cli.env_file)?;
            tracing::info!("Starting scholar-cite MCP server");
            let server = CitationServer::new(Arc::new(Tools::new(&config)?));
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
        }
    }

    Ok(())
}
