//! CLI entry point for the quake_watch tool.
//!
//! Provides subcommands for continuously watching the earthquake feed and for
//! rendering a single snapshot from a URL or a local GeoJSON file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use quake_watch::{
    aggregator::{QuakeWatch, build_snapshot},
    config::WatchConfig,
    controls::spawn_line_reader,
    dashboard::{ConsoleDashboard, Dashboard},
    fetch::{BasicClient, fetch_bytes},
    filter::{FilterSelection, Region, parse_min_magnitude},
    output::{print_json, print_pretty},
    parser::parse_feed,
    series::RollingSeries,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "quake_watch")]
#[command(about = "Watch a live earthquake feed from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed on a fixed interval and redraw the dashboard
    ///
    /// While running, stdin accepts `min <mag>`, `region <token|all>`,
    /// `refresh` and `quit`.
    Watch {
        /// JSON config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Feed URL
        #[arg(long, env = "QUAKE_FEED_URL")]
        feed_url: Option<String>,

        /// Refresh interval in seconds
        #[arg(short, long, env = "QUAKE_REFRESH_SECS")]
        interval: Option<u64>,

        /// Minimum magnitude to include
        #[arg(short, long, env = "QUAKE_MIN_MAG", value_parser = parse_min_magnitude)]
        min_mag: Option<f64>,

        /// Substring to match against the place text, or "all"
        #[arg(short, long, env = "QUAKE_REGION")]
        region: Option<String>,

        /// CSV file to append one summary row per refresh to
        #[arg(long, env = "QUAKE_HISTORY")]
        history: Option<PathBuf>,

        /// Number of timer refreshes to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        cycles: usize,
    },
    /// Render one snapshot from a feed file or URL
    Snapshot {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Minimum magnitude to include
        #[arg(short, long, default_value_t = 0.0, value_parser = parse_min_magnitude)]
        min_mag: f64,

        /// Substring to match against the place text, or "all"
        #[arg(short, long, default_value = "all")]
        region: String,

        /// Log the snapshot as JSON instead of drawing it
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/quake_watch.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("quake_watch.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            config,
            feed_url,
            interval,
            min_mag,
            region,
            history,
            cycles,
        } => {
            let mut settings = match config {
                Some(path) => WatchConfig::load(&path)?,
                None => WatchConfig::default(),
            };
            if let Some(feed_url) = feed_url {
                settings.feed_url = feed_url;
            }
            if let Some(interval) = interval {
                settings.refresh_secs = interval;
            }
            if let Some(min_mag) = min_mag {
                settings.filter.min_magnitude = min_mag;
            }
            if let Some(region) = region {
                settings.filter.region = Region::from_token(&region);
            }
            if history.is_some() {
                settings.history = history;
            }

            watch(settings, cycles).await?;
        }
        Commands::Snapshot {
            source,
            min_mag,
            region,
            json,
        } => {
            let bytes = fetcher(&source).await?;
            let parsed = parse_feed(&bytes)?;
            let filter = FilterSelection::new(min_mag, Region::from_token(&region));
            let snapshot = build_snapshot(&parsed.records, &filter, &mut RollingSeries::default());
            print_pretty(&snapshot.summary);

            if json {
                print_json(&snapshot)?;
            } else {
                let mut dashboard = ConsoleDashboard::new(std::io::stdout());
                for record in snapshot.alerts() {
                    dashboard.alert(record)?;
                }
                dashboard.render(&snapshot)?;
            }
        }
    }

    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}

/// Watches the feed until the cycle limit, `quit` on stdin, or Ctrl+C.
#[tracing::instrument(
    skip(settings),
    fields(feed_url = %settings.feed_url, refresh_secs = settings.refresh_secs)
)]
async fn watch(settings: WatchConfig, cycles: usize) -> Result<()> {
    let dashboard = ConsoleDashboard::new(std::io::stdout());
    let mut app = QuakeWatch::new(BasicClient::new(), settings.feed_url.clone(), dashboard);
    if let Some(path) = &settings.history {
        info!(path = %path.display(), "Recording refresh history");
        app = app.with_history(path.clone());
    }

    let controls = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    if cycles == 0 {
        info!("Watching indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(cycles, "Starting watch");
    }

    app.run(
        settings.filter.clone(),
        Duration::from_secs(settings.refresh_secs),
        cycles,
        controls,
        shutdown,
    )
    .await;

    Ok(())
}
