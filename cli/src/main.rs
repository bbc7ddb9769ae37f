//! CLI entrypoint for LoganGPT
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use logangpt_application::{AuthProvider, ConversationSessionController, SessionConfig};
use logangpt_infrastructure::auth::DEFAULT_IDENTITY_TOOLKIT_ENDPOINT;
use logangpt_infrastructure::{
    ConfigLoader, FileAuthProvider, FileConfig, HttpAssistantBackend, IdentityToolkitAuthProvider,
    InMemoryChatStore, LocalAuthProvider, TerminalSpeechInput,
};
use logangpt_presentation::{ChatRepl, Cli, ConsoleFormatter, ReplConfig, ThinkingSpinner};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting LoganGPT");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;
    debug!(
        "Backend {} (persistence: {})",
        config.backend.resolved_base_url(),
        config.session.persistence
    );

    if !config.repl.color {
        ConsoleFormatter::set_color_enabled(false);
    }

    // === Dependency Injection ===
    let backend = Arc::new(HttpAssistantBackend::new(
        config.backend.resolved_base_url(),
        config.backend.timeout(),
    )?);

    // One-shot mode: a throwaway local session
    if let Some(message) = &cli.message {
        let mut session = ConversationSessionController::new(backend, SessionConfig::local());
        if cli.search {
            session.on_input_changed("/");
            session.activate_search();
        }
        {
            let _spinner = ThinkingSpinner::start(config.repl.show_progress);
            session.send_message(message).await?;
        }
        if let Some(reply) = session.messages().last() {
            println!("{}", ConsoleFormatter::message(reply));
        }
        return Ok(());
    }

    let session_config = config.session.to_session_config();
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let mut controller = ConversationSessionController::new(backend, session_config)
        .with_speech_input(Arc::new(TerminalSpeechInput))
        .with_ui_events(ui_tx);

    if session_config.persistence_enabled {
        let store = match config.session.store_path() {
            Some(path) => InMemoryChatStore::open(&path)
                .await
                .with_context(|| format!("Cannot open chat store {}", path.display()))?,
            None => InMemoryChatStore::new(),
        };
        controller = controller
            .with_chat_store(Arc::new(store))
            .with_auth_provider(build_auth_provider(&config).await?);
    }

    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress,
        history_file: config.repl.history_path(),
    };
    let mut repl = ChatRepl::new(controller, ui_rx).with_config(repl_config);
    repl.run().await?;

    Ok(())
}

/// Install the tracing subscriber; logs go to stderr or to `--log-file`.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if cli.local {
        config.session.persistence = false;
    }
    if let Some(flow) = cli.auth_flow {
        config.session.auth_flow = flow;
    }
    if let Some(email) = &cli.google_account {
        config.auth.federated_email = Some(email.clone());
    }
    if let Some(base) = &cli.api_base {
        config.backend.base_url = base.clone();
    }
    if cli.quiet {
        config.repl.show_progress = false;
    }
}

async fn build_auth_provider(config: &FileConfig) -> Result<Arc<dyn AuthProvider>> {
    match config.auth.provider {
        FileAuthProvider::Local => {
            let mut provider = match config.session.accounts_path() {
                Some(path) => LocalAuthProvider::open(&path)
                    .await
                    .with_context(|| format!("Cannot open account file {}", path.display()))?,
                None => LocalAuthProvider::new(),
            };
            if let Some(email) = config.auth.federated_email() {
                provider = provider.with_federated_account(email)?;
            }
            Ok(Arc::new(provider))
        }
        FileAuthProvider::IdentityToolkit => {
            let api_key = config
                .auth
                .api_key
                .clone()
                .context("auth.api_key is required for the identity_toolkit provider")?;
            let endpoint = config
                .auth
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_IDENTITY_TOOLKIT_ENDPOINT.to_string());
            let provider =
                IdentityToolkitAuthProvider::new(endpoint, api_key, config.backend.timeout())?;
            Ok(Arc::new(provider))
        }
    }
}
