use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use terrascout::analyzer::InfrastructureAnalyzer;
use terrascout::config::Config;
use terrascout::geodata::{HttpTransport, ProximityClient, RegionalInfrastructureDatabase};
use terrascout::market::{HttpPriceIntelligence, PriceIntelligence, StaticTrendTable};
use terrascout::pipeline::score_regions;

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 1;
const EXIT_CONFIG: i32 = 2;
const EXIT_DATA: i32 = 3;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score all configured regions and print the BUY/WATCH/PASS report (default)
    Score,
    /// Show the detailed score breakdown for a single region
    Show {
        /// Region key as configured (e.g. austin-tx)
        key: String,
    },
    /// Write a default config file to edit
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "terrascout")]
#[command(about = "Regional real-estate investment scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/terrascout/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Score);
    let start_time = Instant::now();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install tracing subscriber");

    let config_path = cli.config.map(PathBuf::from);

    // Init runs before any config is loaded
    if let Commands::Init { force } = &command {
        match terrascout::config::write_default_config(config_path, *force) {
            Ok(path) => {
                println!("Wrote default config to {}", path.display());
                println!("Edit the regions and endpoints, then run `terrascout`.");
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Init error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    // Load config
    let config = match terrascout::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate structure and scoring bands at startup; a non-exhaustive or
    // overlapping band table must never reach scoring time.
    if let Err(errors) = config.validate() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    let effective_scoring = config.scoring.clone().unwrap_or_default();
    if let Err(errors) = terrascout::scoring::validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if config.regions.is_empty() {
        eprintln!("No regions configured in config file.");
        eprintln!("Add regions to ~/.config/terrascout/config.yaml:");
        eprintln!("  regions:");
        eprintln!("    - key: austin-tx");
        eprintln!("      latitude: 30.27");
        eprintln!("      longitude: -97.74");
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!("Loaded {} regions from config", config.regions.len());
        for (i, region) in config.regions.iter().enumerate() {
            eprintln!(
                "  Region {}: {} ({:.2}, {:.2})",
                i + 1,
                region.key,
                region.latitude,
                region.longitude
            );
        }
        // validate() already proved the schedule parses
        let schedule = config.geodata.schedule().expect("validated schedule");
        eprintln!("Geodata attempt schedule:");
        for (i, plan) in schedule.attempts().iter().enumerate() {
            eprintln!(
                "  Attempt {}: {} (timeout {:?}, delay {:?})",
                i + 1,
                plan.endpoint,
                plan.timeout,
                plan.delay
            );
        }
    }

    let regions: Vec<_> = config.regions.iter().map(|r| r.to_region()).collect();

    let analyzer = match build_analyzer(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Failed to create geodata client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };
    let market = match build_market(&config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to create market client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    match command {
        Commands::Score => {
            let report =
                score_regions(&analyzer, market.as_ref(), &effective_scoring, &regions).await;

            let use_colors = terrascout::output::should_use_colors();
            println!("{}", terrascout::output::format_report(&report, use_colors));

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} regions in {:?} (generated {})",
                    report.regions_analyzed.len() + report.unscored.len(),
                    start_time.elapsed(),
                    report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }

            // Nothing scored and nothing reachable: treat as a network-level failure
            if report.scored_len() == 0 && !report.unscored.is_empty() {
                eprintln!("No region could be scored. Check your network connection and endpoints.");
                std::process::exit(EXIT_NETWORK);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Show { key } => {
            let Some(region) = regions.iter().find(|r| r.key == key).cloned() else {
                eprintln!("Unknown region '{}'. Configured regions:", key);
                for region in &regions {
                    eprintln!("  {}", region.key);
                }
                std::process::exit(EXIT_DATA);
            };

            let report = score_regions(
                &analyzer,
                market.as_ref(),
                &effective_scoring,
                std::slice::from_ref(&region),
            )
            .await;

            let use_colors = terrascout::output::should_use_colors();
            if let Some(scored) = report
                .buy_recommendations
                .iter()
                .chain(&report.watch_list)
                .chain(&report.pass_list)
                .next()
            {
                println!("{}", terrascout::output::format_region_detail(scored, use_colors));
                std::process::exit(EXIT_SUCCESS);
            }

            if let Some(unscored) = report.unscored.first() {
                eprintln!("Region '{}' could not be scored: {}", key, unscored.reason);
            }
            std::process::exit(EXIT_NETWORK);
        }
        Commands::Init { .. } => unreachable!("handled above"),
    }
}

fn build_analyzer(config: &Config) -> anyhow::Result<InfrastructureAnalyzer<HttpTransport>> {
    let schedule = config.geodata.schedule()?;
    let client = ProximityClient::new(HttpTransport::new()?, schedule);
    let fallback = RegionalInfrastructureDatabase::new(config.fallback_database.clone());
    Ok(InfrastructureAnalyzer::new(client, fallback, config.geodata.radii_km))
}

fn build_market(config: &Config) -> anyhow::Result<Box<dyn PriceIntelligence>> {
    match &config.market.endpoint {
        Some(endpoint) => Ok(Box::new(HttpPriceIntelligence::new(
            endpoint.clone(),
            config.market.window_days,
        )?)),
        None => Ok(Box::new(StaticTrendTable::new(
            config.market.static_trends.clone(),
        ))),
    }
}
