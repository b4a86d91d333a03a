//! Vista - Progressive Image Gallery
//!
//! Entry point for the gallery application.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use vista::{NAME, VERSION, VistaConfig};

/// Lazy-loading photo gallery for a CMS or a local JSON listing.
#[derive(Parser)]
#[command(name = "vista", version)]
struct Args {
    /// CMS origin (http/https) or path to a JSON listing.
    #[arg(env = "VISTA_SOURCE")]
    source: Option<String>,

    /// Load every image without opening a window and print a summary.
    #[arg(long)]
    headless: bool,

    /// JSON configuration file.
    #[arg(long, env = "VISTA_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum simultaneous image fetches.
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Admission cadence in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Per-image fetch timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    /// File configuration with command-line overrides applied
    fn into_config(self) -> vista::Result<VistaConfig> {
        let mut config = match &self.config {
            Some(path) => VistaConfig::from_file(path)?,
            None => VistaConfig::default(),
        };
        if self.source.is_some() {
            config.source = self.source;
        }
        if let Some(max) = self.max_concurrent {
            config.loader.max_concurrent = max;
        }
        if let Some(tick) = self.tick_ms {
            config.loader.tick_interval_ms = tick;
        }
        if let Some(timeout) = self.timeout_secs {
            config.loader.fetch_timeout_secs = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let headless = args.headless;
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if headless {
        run_headless_mode(&config)
    } else {
        run_gui_mode(config)
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_headless_mode(config: &VistaConfig) -> vista::Result<ExitCode> {
    println!("🖼  {} v{} - headless load", NAME, VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let report = runtime.block_on(vista::gallery::run_headless(config))?;

    println!("✅ {} of {} image(s) loaded", report.stats.loaded, report.images);
    for (id, reason) in &report.failures {
        println!("   • {}: {}", id, reason);
    }
    println!("⏱  {:.2?}", report.elapsed);

    Ok(if report.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_gui_mode(config: VistaConfig) -> vista::Result<ExitCode> {
    log::info!("{} v{} starting", NAME, VERSION);
    vista::gallery::run(config)?;
    Ok(ExitCode::SUCCESS)
}
