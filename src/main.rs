//! Boipeba - sea and weather conditions for Ilha de Boipeba
//!
//! A CLI that fetches the Open-Meteo marine and weather forecasts,
//! computes the moon phase and prints a conditions snapshot.
//!
//! Exit codes:
//!   0 - Conditions loaded (possibly with some values unknown)
//!   1 - Runtime error (config, HTTP client setup, etc.)
//!   2 - Both forecast sources failed

use anyhow::{Context, Result};
use boipeba_conditions::aggregator::ConditionsAggregator;
use boipeba_conditions::cli::{Args, OutputFormat};
use boipeba_conditions::config::{Config, DEFAULT_CONFIG_FILE};
use boipeba_conditions::models::Snapshot;
use boipeba_conditions::report::{render_json, render_text, ReportOptions};
use boipeba_conditions::sources::{OpenMeteoMarine, OpenMeteoWeather, SourceSettings};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

type Aggregator = ConditionsAggregator<OpenMeteoMarine, OpenMeteoWeather>;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Boipeba conditions v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .boipeba.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the location, endpoints or tide-table links.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the aggregator from configuration and run once or in watch mode.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let zone = config.location.zone()?;
    let settings = SourceSettings::from(&config);
    let aggregator = ConditionsAggregator::new(
        config.location.coordinate(),
        zone,
        OpenMeteoMarine::new(&settings)?,
        OpenMeteoWeather::new(&settings)?,
    );
    let options = ReportOptions::from(&config);

    info!(
        "Location: {} ({}), timezone {}",
        config.location.name,
        aggregator.coordinate(),
        config.location.timezone
    );

    match args.watch {
        Some(secs) => watch_conditions(&aggregator, &args, &options, Duration::from_secs(secs)).await,
        None => {
            let snapshot = refresh_with_spinner(&aggregator, &args).await;
            print_snapshot(&snapshot, &args, &options)?;
            Ok(exit_code(&snapshot))
        }
    }
}

/// Refresh once, animating a spinner while the snapshot is loading.
async fn refresh_with_spinner(aggregator: &Aggregator, args: &Args) -> Arc<Snapshot> {
    if !args.show_spinner() {
        return aggregator.refresh().await;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Fetching marine and weather forecasts...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let snapshot = aggregator.refresh().await;
    pb.finish_and_clear();
    snapshot
}

/// Refresh on a fixed interval and print every published snapshot.
async fn watch_conditions(
    aggregator: &Aggregator,
    args: &Args,
    options: &ReportOptions,
    interval: Duration,
) -> Result<i32> {
    info!(
        "Refreshing every {}s, press Ctrl-C to stop",
        interval.as_secs()
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupted, stopping"),
            Err(e) => {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    aggregator
        .watch(interval, shutdown, |snapshot| {
            print_snapshot(snapshot, args, options)
        })
        .await?;

    Ok(exit_code(&aggregator.latest()))
}

fn print_snapshot(snapshot: &Snapshot, args: &Args, options: &ReportOptions) -> Result<()> {
    match args.format {
        OutputFormat::Text => println!("{}", render_text(snapshot, options)),
        OutputFormat::Json => println!("{}", render_json(snapshot, options)?),
    }
    Ok(())
}

fn exit_code(snapshot: &Snapshot) -> i32 {
    if snapshot.fetch_state.is_failed() {
        2
    } else {
        0
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
