use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod ai;
mod chat;
mod cli;
mod fixtures;
mod gui;
mod navigation;
mod reports;
mod role;
mod search;
mod session;
mod settings;
mod shell;
mod store;
mod theme;
mod views;

use ai::{AiService, GeminiClient};
use role::Role;
use settings::{default_config_path, load_settings, save_settings, Settings};
use store::StoreHandle;

#[derive(Parser, Debug)]
#[command(
    name = "schoolhub",
    version,
    about = "SchoolHub: admin, teacher, parent and student dashboards"
)]
struct CliArgs {
    /// Choose GUI (default) or CLI mode
    #[arg(long, value_enum, default_value = "gui")]
    mode: RunMode,
    /// Settings file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sign straight in as this role
    #[arg(long, value_enum)]
    role: Option<Role>,
    /// Write a settings file with default values and exit
    #[arg(long)]
    write_default_config: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RunMode {
    Gui,
    Cli,
}

fn log_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schoolhub=info")),
        )
        .finish()
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so CLI mode keeps stdout for command output.
    log_subscriber(std::io::stderr).init();

    let args = CliArgs::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);

    if args.write_default_config {
        save_settings(&Settings::default(), &config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote default settings to {}", config_path.display());
        return Ok(());
    }

    let settings = load_settings(&config_path).context("loading settings")?;
    info!(config = %config_path.display(), model = %settings.ai.model, "settings loaded");

    let client = GeminiClient::from_env(&settings.ai).context("building AI client")?;
    if !client.has_key() {
        warn!("API_KEY is not set; AI features will show the fallback message");
    }
    let ai = AiService::new(Arc::new(client)).context("starting AI runtime")?;
    let store = StoreHandle::new(fixtures::seed());

    match args.mode {
        RunMode::Gui => gui::launch_gui(settings, store, ai, args.role)
            .map_err(|e| anyhow::anyhow!("failed to start GUI: {e}"))?,
        RunMode::Cli => cli::run_cli(store, ai, args.role).context("CLI session")?,
    }
    Ok(())
}
