//! Licita - messaging runtime of the Naval Auction Assistant extension.
//!
//! Runs the background, content and popup contexts against an in-process
//! extension host and drives them from the command line.

mod cli;
mod session;

use clap::Parser;
use serde_json::Map;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use licita_config::{Config, ConfigError, ConfigLoader, ConfigValidator, LoggingConfig};
use licita_platform::InstallReason;
use licita_protocols::Category;

use cli::{Cli, Commands, PingFrom, DEFAULT_URL};
use session::{Session, PAGE_ELEMENTS};

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = logging.resolved_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("licita")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    for warning in ConfigValidator::validate(config).into_result()? {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    validate_config(&config)?;

    match cli.command {
        None => run_session(&config, 1, DEFAULT_URL, None).await,
        Some(Commands::Run {
            tabs,
            url,
            previous_version,
        }) => run_session(&config, tabs, &url, previous_version).await,
        Some(Commands::Ping { from }) => ping(&config, from).await,
        Some(Commands::Routes) => {
            print_routes();
            Ok(())
        }
    }
}

/// Walk through what the popup UI does on open: connect, read status and
/// settings, list auctions, then analyze and highlight every tab.
async fn run_session(
    config: &Config,
    tabs: usize,
    url: &str,
    previous_version: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Starting {} v{} with {} tab(s)",
        config.extension.name, config.extension.version, tabs
    );

    let install = match previous_version {
        Some(previous_version) => InstallReason::Update { previous_version },
        None => InstallReason::Install,
    };
    let session = Session::start(config, tabs, url, &install)?;
    info!("Session started: {:?}", session.background);
    let popup = &session.popup;

    let pong = popup.initialize().await?;
    println!("background: ping ok at {}", pong.timestamp);

    let status = popup.extension_status().await?;
    println!("status: enabled={} version={}", status.is_enabled, status.version);

    let settings = popup.settings().await?;
    println!("settings: {}", serde_json::to_string(&settings)?);

    let auctions = popup.fetch_auctions().await?;
    println!("auctions: {} listed", auctions.auctions.len());

    for content in &session.tabs {
        let Some(tab_id) = content.tab_id() else {
            continue;
        };
        match popup.analyze_auction(Some(tab_id)).await {
            Ok(snapshot) => println!("tab {}: {} ({})", tab_id, snapshot.title, snapshot.url),
            Err(e) => println!("tab {}: analyze failed: {}", tab_id, e),
        }
        let ack = popup
            .highlight_elements(tab_id, PAGE_ELEMENTS[1], None)
            .await?;
        println!("tab {}: highlight {}", tab_id, if ack.success { "ok" } else { "missed" });
    }

    popup
        .update_badge(session.tabs.len().to_string(), Some("#1E88E5"))
        .await?;
    println!("badge: {:?}", session.host.badge().text);

    if let Err(e) = popup.fetch_document("notice-documents").await {
        println!("document: {}", e);
    }

    let mut patch = Map::new();
    patch.insert("lastRun".to_string(), serde_json::json!(pong.timestamp));
    popup.update_settings(patch).await?;

    info!("Session finished");
    Ok(())
}

async fn ping(config: &Config, from: PingFrom) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::start(config, 1, DEFAULT_URL, &InstallReason::Install)?;

    let pong = match from {
        PingFrom::Popup => session.popup.ping_background().await?,
        PingFrom::Content => match session.tabs.first() {
            Some(content) => content.ping_background().await?,
            None => return Err("no content script running".into()),
        },
    };
    println!("{}", serde_json::to_string_pretty(&pong)?);
    Ok(())
}

fn print_routes() {
    for category in Category::ALL {
        for action in category.actions() {
            println!("{}:{}", category, action);
        }
    }
}
