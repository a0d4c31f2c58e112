//! # BoardWatch CLI
//!
//! Watches a monday.com board for suspended items and keeps reminding the
//! owning Slack channel until the item's status changes.
//!
//! Usage:
//!   boardwatch run                     # Poll forever + health/status server
//!   boardwatch once                    # One cycle, print the report
//!   boardwatch once --dry-run          # Log reminders instead of sending them
//!   boardwatch state 1234567890        # Show an item's last_notified marker
//!   boardwatch config                  # Show resolved configuration

use anyhow::Result;
use boardwatch_channels::{LogSink, SlackSink};
use boardwatch_core::traits::{ChannelSink, StateStore};
use boardwatch_core::{AppConfig, MemoryStateStore};
use boardwatch_gateway::AppState;
use boardwatch_monday::{MondayClient, MondaySource, MondayStateStore};
use boardwatch_scheduler::{CycleReport, EngineSettings, NotificationEngine, Scheduler};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "boardwatch",
    version,
    about = "🔔 BoardWatch — Slack reminders for suspended monday.com items"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the poll loop and the health/status server
    Run,

    /// Run a single poll cycle and print what happened
    Once {
        /// Log reminders instead of posting them; never write to the board
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the stored last_notified marker of one item
    State {
        /// monday.com item id
        item_id: String,
    },

    /// Print the resolved configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "boardwatch=debug,tower_http=debug"
    } else {
        "boardwatch=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();
    }

    let config = AppConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => run(config).await,
        Commands::Once { dry_run } => once(config, dry_run).await,
        Commands::State { item_id } => {
            let client = Arc::new(MondayClient::new(&config.monday)?);
            let store = MondayStateStore::new(client);
            let marker = store.read(&item_id).await?;
            println!("{}", describe_marker(&item_id, marker.as_deref()));
            Ok(())
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config.redacted())?);
            Ok(())
        }
    }
}

/// One line for the `state` command. An unknown item is an error earlier on.
fn describe_marker(item_id: &str, marker: Option<&str>) -> String {
    match marker {
        Some(value) => format!("{item_id}: {value}"),
        None => format!("{item_id}: (never notified)"),
    }
}

/// Build the engine against the live board. With `dry_run`, reminders go to
/// the log and markers stay in memory.
fn build_engine(config: &AppConfig, dry_run: bool) -> Result<Arc<NotificationEngine>> {
    for channel in config.missing_webhooks() {
        tracing::warn!("⚠️ No Slack webhook configured for {channel}; its reminders will fail and retry");
    }

    let client = Arc::new(MondayClient::new(&config.monday)?);
    let source = Arc::new(MondaySource::new(Arc::clone(&client)));
    let (sink, state): (Arc<dyn ChannelSink>, Arc<dyn StateStore>) = if dry_run {
        (Arc::new(LogSink::new()), Arc::new(MemoryStateStore::new()))
    } else {
        (
            Arc::new(SlackSink::new(config.slack.clone())?),
            Arc::new(MondayStateStore::new(client)),
        )
    };

    Ok(Arc::new(NotificationEngine::new(
        EngineSettings::from_config(config),
        source,
        sink,
        state,
    )))
}

async fn once(config: AppConfig, dry_run: bool) -> Result<()> {
    let engine = build_engine(&config, dry_run)?;
    let report = engine.poll(chrono::Utc::now()).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &CycleReport) {
    for outcome in &report.outcomes {
        println!("  {:<14} {}", outcome.item_id, outcome.action);
    }
    println!("{}", report.summary());
}

async fn run(config: AppConfig) -> Result<()> {
    tracing::info!(
        "🔔 BoardWatch v{} watching board {} (reminders every {}h)",
        env!("CARGO_PKG_VERSION"),
        config.monday.board_id,
        config.notify.interval_hours
    );

    let engine = build_engine(&config, false)?;
    let scheduler = Scheduler::from_config(engine, &config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let gateway_state = Arc::new(AppState {
        config: config.gateway.clone(),
        start_time: std::time::Instant::now(),
        board_id: config.monday.board_id,
        status: scheduler.subscribe(),
    });
    let mut gateway_shutdown = shutdown_rx.clone();
    let mut gateway = tokio::spawn(boardwatch_gateway::start_server(gateway_state, async move {
        let _ = gateway_shutdown.wait_for(|stop| *stop).await;
    }));
    let poller = tokio::spawn(scheduler.run(shutdown_rx));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown requested, finishing in-flight cycle...");
        }
        served = &mut gateway => {
            shutdown_tx.send_replace(true);
            poller.await??;
            served??;
            anyhow::bail!("gateway exited unexpectedly");
        }
    }

    shutdown_tx.send_replace(true);
    poller.await??;
    gateway.await??;
    tracing::info!("👋 BoardWatch stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_marker() {
        assert_eq!(
            describe_marker("42", Some("2024-01-02T00:00:00Z")),
            "42: 2024-01-02T00:00:00Z"
        );
        assert_eq!(describe_marker("42", None), "42: (never notified)");
    }

    #[test]
    fn test_cli_parses_state_command() {
        let cli = Cli::try_parse_from(["boardwatch", "state", "42"]).unwrap();
        assert!(matches!(cli.command, Commands::State { ref item_id } if item_id == "42"));
    }
}
