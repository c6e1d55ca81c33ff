//! embargo - Country IPv4 blocklist builder
//!
//! Turns the GeoLite2 Country CSV archive into a CIDR list for a set of countries.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use embargo::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Update {
            url,
            extract_dir,
            selection,
            dry_run,
        } => embargo::commands::update::run(url, extract_dir, &selection, dry_run, &cli.config).await,
        Commands::Build {
            dataset,
            selection,
            stdout,
        } => embargo::commands::build::run(&dataset, &selection, stdout, &cli.config),
        Commands::Config => embargo::commands::show_config::run(&cli.config),
        Commands::Version => {
            println!("embargo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
