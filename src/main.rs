// src/main.rs — pulsewatch entry point

use clap::Parser;

use pulsewatch::cli::run::{print_summary, run_monitor};
use pulsewatch::cli::{Cli, Commands};
use pulsewatch::infra::config::Config;
use pulsewatch::infra::logger;
use pulsewatch::notify::{self, jsonl};

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / PULSEWATCH_LOG)
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command {
        Some(Commands::Config) => {
            print!("{}", Config::default_toml()?);
        }
        Some(Commands::Tail { n }) => {
            let path = notify::event_log_path(&config.notify);
            for event in jsonl::tail(&path, n)? {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Some(Commands::Once) => {
            let reports = run_monitor(&config, &cli.keyword, Some(1), cli.quiet).await?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Some(Commands::Run { cycles }) => {
            let reports = run_monitor(&config, &cli.keyword, cycles, cli.quiet).await?;
            print_summary(&reports);
        }
        None => {
            let reports = run_monitor(&config, &cli.keyword, None, cli.quiet).await?;
            print_summary(&reports);
        }
    }

    Ok(())
}
