//! Broker Segments — RFM client segmentation and channel attribution
//!
//! Usage:
//!   broker-segments serve --port 5000              — Launch the HTTP API
//!   broker-segments segment --as-of 2024-06-01     — Run segmentation from CLI

mod config;
mod routes;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use engine::{run_segmentation, ChannelAggregator, SegmentationConfig, SegmentationReport};
use persistence::Database;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::routes::AppState;

pub const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

#[derive(Parser)]
#[command(name = "broker-segments")]
#[command(about = "RFM segmentation and channel attribution for brokerage clients", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },
    /// Segment all clients and print the cluster summary
    Segment {
        /// Reference date for recency (default: today, UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Number of clusters
        #[arg(long, default_value_t = 5)]
        clusters: usize,
        /// Random seed for cluster initialization
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Optional JSON export path for the full report
        #[arg(long)]
        export: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug,broker_segments=debug")
    } else {
        EnvFilter::new("info,engine=info,broker_segments=info,sqlx=warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&config, &host, port).await?;
        }
        Commands::Segment {
            as_of,
            clusters,
            seed,
            export,
        } => {
            let segmentation = SegmentationConfig {
                n_clusters: clusters,
                seed,
                ..Default::default()
            };
            cmd_segment(&config, as_of, segmentation, export).await?;
        }
    }

    Ok(())
}

async fn open_database(config: &AppConfig) -> anyhow::Result<Database> {
    let db = Database::new(&config.db_path).await.map_err(|e| {
        error!("Failed to open database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;
    info!("Database opened: {}", config.db_path);
    Ok(db)
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(config: &AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    info!("Broker Segments v{} starting...", APP_VERSION);

    let db = Arc::new(open_database(config).await?);
    let state = AppState {
        channels: Arc::new(ChannelAggregator::new(db.pool_clone(), config.cache_ttl)),
        db,
        segmentation: Arc::new(SegmentationConfig::default()),
    };

    let app = routes::app(state);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Broker Segments v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health                    - Health check");
    println!("  GET  /api/channels?type=user_count  - Accounts per channel");
    println!("  GET  /api/channels?type=commission_sum - Commission per channel");
    println!("  GET  /api/channels?type=lifetime    - Mean client lifetime per channel");
    println!("  GET  /api/segments                  - RFM segmentation report");
    println!("\n  Database: {}", config.db_path);
    println!("  Channel cache TTL: {}s", config.cache_ttl.as_secs());
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Segment command — batch run from CLI
// ============================================================================

async fn cmd_segment(
    config: &AppConfig,
    as_of: Option<NaiveDate>,
    segmentation: SegmentationConfig,
    export: Option<String>,
) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());

    let report = run_segmentation(db.pool(), as_of, &segmentation).await?;
    print_report(&report);

    if let Some(export_path) = export {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&export_path, &json)?;
        println!("\nReport exported to {}", export_path);
    }

    Ok(())
}

fn print_report(report: &SegmentationReport) {
    println!("\n=== RFM Segmentation as of {} ===", report.as_of);
    println!(
        "Clients: {} loaded, {} scored",
        report.clients_loaded, report.clients_scored
    );
    println!(
        "Weights: recency {:.4} | frequency {:.4} | monetary {:.4}{}",
        report.weights.recency,
        report.weights.frequency,
        report.weights.monetary,
        if report.weights.fallback { " (equal-weight fallback)" } else { "" }
    );

    println!("\n  {:>7}  {:>8}  {:>16}", "Cluster", "Clients", "Commission");
    println!("  {}", "-".repeat(35));
    for c in &report.clusters {
        println!(
            "  {:>7}  {:>8}  {:>16.2}",
            c.cluster_number, c.cluster_count, c.total_commission
        );
    }
    println!(
        "\nInertia: {:.4} after {} iterations",
        report.inertia, report.iterations
    );
}
