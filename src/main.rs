use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use tragedian::{commands, ui, ChatSession, Config, ConversationController, GeminiClient, PersonaCatalog};

#[derive(Parser)]
#[command(name = "tragedian")]
#[command(version)]
#[command(about = "Converse with Shakespeare's tragic heroes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Persona to speak with (see `tragedian personas`)
    #[arg(long, global = true)]
    persona: Option<String>,

    /// Gemini API key, held in memory for this run only
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    /// Root URL of the Gemini REST API
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available personas
    Personas,
    /// Say one thing to a persona and print the reply
    Ask {
        /// What to say
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(persona) = cli.persona {
        config.default_persona = persona;
    }

    let catalog = PersonaCatalog::default();

    match cli.command {
        Some(Commands::Personas) => {
            init_logging(None)?;
            commands::list_personas(&catalog);
            Ok(())
        }
        Some(Commands::Ask { text }) => {
            init_logging(None)?;
            let controller = build_controller(&config, catalog, cli.api_key)?;
            commands::ask(controller, &text.join(" ")).await
        }
        None => {
            // The TUI owns the terminal, so logs go to a file.
            config.ensure_home()?;
            init_logging(Some(&config.log_path()))?;
            let controller = build_controller(&config, catalog, cli.api_key)?;
            ui::app::run(controller).await
        }
    }
}

fn build_controller(
    config: &Config,
    catalog: PersonaCatalog,
    api_key: Option<String>,
) -> Result<ConversationController> {
    let persona = catalog.get(&config.default_persona).with_context(|| {
        format!(
            "Unknown persona '{}'. Run 'tragedian personas' to see the company.",
            config.default_persona
        )
    })?;

    let session = ChatSession::new(persona).with_credential(api_key);
    let client = GeminiClient::new(&config.base_url, &config.model)
        .context("Failed to create HTTP client")?;

    Ok(ConversationController::new(catalog, session, Arc::new(client)).with_ui(&config.ui))
}

/// Respects RUST_LOG. Defaults to `info` in the log file and `warn` on stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}
