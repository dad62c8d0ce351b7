//! xbox-webapi-tui - interactive Xbox Live login
//!
//! Loads stored tokens, authenticates (asking for credentials and a second
//! factor when needed) and saves the resulting tokens.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xbox_webapi::auth::{self, AuthManager, LiveAuthManager};
use xbox_webapi::config::{self, Config};
use xbox_webapi::tui::{self, AppContext, Backend, LogBuffer};

#[derive(Parser)]
#[command(name = "xbox-webapi-tui")]
#[command(about = "Basic text user interface", long_about = None)]
struct Cli {
    /// Token file, created by a previous login
    #[arg(short, long, default_value_os_t = config::default_tokens_path())]
    tokens: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    // Log lines go to the log view, never to the terminal
    let logs = LogBuffer::with_capacity(config.ui.log_capacity);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,xbox_webapi=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(logs.clone()),
        )
        .init();

    let mut manager = LiveAuthManager::new(config.auth.clone());
    let need_full_auth = auth::load_stored_tokens(&mut manager, &cli.tokens);
    tracing::debug!(
        "Token file {}, full authentication needed: {}",
        cli.tokens.display(),
        need_full_auth
    );

    let ctx = AppContext {
        tokens_path: cli.tokens,
        need_full_auth,
        ui: config.ui,
    };
    let manager: Box<dyn AuthManager> = Box::new(manager);
    let backend = Backend::start(manager, ctx.tokens_path.clone());

    if !tui::run(ctx, backend, logs).await? {
        tracing::info!("Exited without authenticating");
    }
    Ok(())
}
