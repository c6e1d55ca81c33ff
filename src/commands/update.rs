//! Update command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::archive::extract;
use crate::cli::Selection;
use crate::commands::build::{generate, Sink};
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::lock::LockGuard;
use crate::pipeline::Dataset;

const ARCHIVE_FILE: &str = "geolite2-country-csv.zip";

/// Run the update command: download, extract, build, write
pub async fn run(
    url: Option<String>,
    extract_dir: Option<PathBuf>,
    selection: &Selection,
    dry_run: bool,
    config_path: &Path,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    if let Some(url) = url {
        config.url = url;
    }
    if let Some(dir) = extract_dir {
        config.extract_dir = dir;
    }
    selection.apply(&mut config);
    config.validate()?;

    let lock = LockGuard::acquire(&config.extract_dir)?;
    debug!("Holding lock {:?}", lock.path());

    let archive = config.extract_dir.join(ARCHIVE_FILE);
    let fetcher = Fetcher::new()?;
    fetcher.download(&config.url, &archive).await?;

    let root = extract(&archive, &config.extract_dir)?;
    if let Err(e) = fs::remove_file(&archive) {
        debug!("Could not remove {:?}: {}", archive, e);
    }

    let dataset = Dataset::new(root);
    info!("Using dataset {:?}", dataset.root());

    let sink = if dry_run { Sink::DryRun } else { Sink::File };
    generate(&dataset, &config, sink)?;

    Ok(())
}
