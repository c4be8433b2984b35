//! Coverlab Router binary
//!
//! Starts the classroom HTTP service.

use coverlab_router::{config::RouterConfig, start_server, RouterError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RouterError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        RouterConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: coverlab-router --config <path-to-config.toml>");
        eprintln!();
        RouterConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Coverlab Router - Confidence interval classroom service");
    println!();
    println!("USAGE:");
    println!("    coverlab-router --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    coverlab-router --config config/router.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    bind_address / bind_port     Where to listen");
    println!("    reveal_population_mean       Show mu on GET /parameters (default false)");
    println!("    [population]                 mean, std_dev, sample_size,");
    println!("                                 min_allowed_value, max_allowed_value");
    println!("    [ledger]                     path (SQLite file, omit for memory),");
    println!("                                 timeout_ms, cache_ttl_secs, queue_depth");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG                     Log filter (default: info)");
    println!();
}
