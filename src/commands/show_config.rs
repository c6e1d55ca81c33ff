//! Print the effective configuration.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
