mod announce;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use deckwatch_core::AnnouncementHandler;
use deckwatch_types::WatchConfig;
use tracing_subscriber::EnvFilter;

use announce::BannerPrinter;

const APP_NAME: &str = "deckwatch";

#[derive(Parser, Debug)]
#[command(version, about = "Identify the opponent's deck archetype from Hearthstone's Power.log")]
struct Cli {
    /// Power.log to follow
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Meta deck catalogue (JSON)
    #[arg(short, long)]
    catalogue: Option<PathBuf>,

    /// Matching cards a verdict must strictly exceed
    #[arg(long)]
    min_confidence: Option<usize>,

    /// Poll interval in milliseconds once caught up with the log
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Skip existing log contents and only follow new lines
    #[arg(long)]
    from_end: bool,

    /// Local player display name (with or without the #tag)
    #[arg(short, long)]
    player: Option<String>,

    /// Treat this seat as the opponent in every match
    #[arg(long)]
    opponent_seat: Option<u32>,

    /// Persist the effective settings to the config file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(self, config: &mut WatchConfig) {
        if let Some(log) = self.log {
            config.log_path = Some(log);
        }
        if let Some(catalogue) = self.catalogue {
            config.catalogue_path = catalogue;
        }
        if let Some(min_confidence) = self.min_confidence {
            config.min_confidence = min_confidence;
        }
        if let Some(poll_ms) = self.poll_ms {
            config.poll_interval_ms = poll_ms;
        }
        if self.from_end {
            config.replay_history = false;
        }
        if let Some(player) = self.player {
            config.local_player = Some(player);
        }
        if let Some(seat) = self.opponent_seat {
            config.opponent_seat = Some(seat);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("DECKWATCH_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> WatchConfig {
    match confy::load::<WatchConfig>(APP_NAME, None) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load config, using defaults");
            WatchConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let save_config = cli.save_config;

    let mut config = load_config();
    cli.apply(&mut config);

    if save_config {
        match confy::store(APP_NAME, None, &config) {
            Ok(()) => tracing::info!("Saved settings"),
            Err(err) => tracing::warn!(error = %err, "Failed to save config"),
        }
    }

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let handlers: Vec<Box<dyn AnnouncementHandler + Send>> = vec![Box::new(BannerPrinter)];

    match deckwatch_core::watch(&config, handlers, shutdown).await {
        Ok(summary) => {
            tracing::info!(
                lines = summary.lines,
                events = summary.events,
                matches = summary.matches,
                announcements = summary.announcements,
                "Monitor stopped"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Monitor failed");
            eprintln!("deckwatch: {err}");
            ExitCode::FAILURE
        }
    }
}
