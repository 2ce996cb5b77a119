use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use focusguard_application::{AppConfig, Clock, SystemClock};
use focusguard_bridge::channel::{dispatch, MethodCall};
use focusguard_detect::ContentNode;
use focusguard_events::Platform;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod app;
mod simulated;

use app::App;

#[derive(Parser)]
#[command(name = "focusguard", version, about = "FocusGuard short-form video blocker")]
struct Cli {
    /// Config file (defaults to $FOCUSGUARD_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show protection state and today's stats
    Status,
    /// Turn protection on or off
    Toggle,
    /// Re-check the accessibility permission
    RefreshPermission,
    /// Enable or disable blocking for one platform
    Set {
        /// Platform slug or label, e.g. `youtube-shorts` or "TikTok"
        platform: Platform,
        #[arg(value_enum)]
        state: Switch,
    },
    /// Recent block events, newest first
    History,
    /// Grant the simulated accessibility permission
    Grant,
    /// Revoke the simulated accessibility permission
    Revoke,
    /// Run the enforcement probe on a captured content tree
    Simulate {
        /// Foreground package name
        package: String,
        /// Content tree JSON file
        tree: PathBuf,
    },
    /// Send a raw method-channel call
    Call {
        method: String,
        /// JSON arguments
        arguments: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

async fn set_permission(app: &App, granted: bool) -> anyhow::Result<()> {
    app.probe.set_granted(granted)?;
    let granted = app.store.refresh_permission().await?;
    println!("Accessibility permission: {}.", on_off(granted));
    Ok(())
}

async fn simulate(app: &App, package: &str, tree: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(tree)
        .with_context(|| format!("failed to read {}", tree.display()))?;
    let root: ContentNode = serde_json::from_str(&content)
        .with_context(|| format!("invalid content tree in {}", tree.display()))?;

    if !app.service.config().protection_active {
        println!("Protection is off; nothing will be blocked.");
        return Ok(());
    }

    let mut state = app.store.subscribe();
    let Some(event) = app
        .service
        .on_content_changed(package, Some(&root), SystemClock.now_ms())
    else {
        println!("No short-form content detected for {package}.");
        return Ok(());
    };

    tokio::time::timeout(
        Duration::from_secs(2),
        state.wait_for(|s| s.recent_activity.first() == Some(&event)),
    )
    .await
    .context("block event was not recorded")??;

    // Let the overlay hide and both back navigations run.
    let config = &app.config;
    tokio::time::sleep(config.overlay_duration() + config.back_repeat_delay() * 2).await;

    let snapshot = app.store.snapshot();
    println!(
        "Blocked {} ({} blocked today).",
        event.platform, snapshot.blocked_today
    );
    Ok(())
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let app = App::start(config).await?;

    match cli.command {
        Commands::Status => print_json(&app.store.snapshot())?,
        Commands::Toggle => {
            let active = app.store.toggle_protection().await?;
            println!("Protection is {}.", on_off(active));
        }
        Commands::RefreshPermission => {
            let granted = app.store.refresh_permission().await?;
            println!("Accessibility permission: {}.", on_off(granted));
        }
        Commands::Set { platform, state } => {
            let enabled = matches!(state, Switch::On);
            app.store.update_setting(platform, enabled).await?;
            println!("{platform} blocking is {}.", on_off(enabled));
        }
        Commands::History => {
            let snapshot = app.store.refresh_stats().await?;
            if snapshot.recent_activity.is_empty() {
                println!("No blocks recorded.");
            }
            for event in &snapshot.recent_activity {
                println!("{}\t{}", event.timestamp, event.platform);
            }
        }
        Commands::Grant => set_permission(&app, true).await?,
        Commands::Revoke => set_permission(&app, false).await?,
        Commands::Simulate { package, tree } => simulate(&app, &package, &tree).await?,
        Commands::Call { method, arguments } => {
            let arguments = match arguments {
                Some(raw) => serde_json::from_str(&raw).context("arguments must be JSON")?,
                None => serde_json::Value::Null,
            };
            let response = dispatch(app.bridge.as_ref(), &MethodCall::new(method, arguments)).await;
            print_json(&response)?;
        }
    }

    app.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(database = %config.database_path.display(), "starting focusguard");
    run(cli, config).await
}
