//! Build command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::Selection;
use crate::config::Config;
use crate::output::write_atomic;
use crate::pipeline::{Dataset, Outcome, Pipeline};
use crate::utils::format_count;

/// Where the finished list goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Atomically replace the configured output file
    File,
    /// Print to stdout
    Stdout,
    /// Log the result only
    DryRun,
}

/// Run the build command against an already extracted dataset
pub fn run(dataset: &Path, selection: &Selection, stdout: bool, config_path: &Path) -> Result<()> {
    let mut config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    selection.apply(&mut config);
    config.validate()?;

    let sink = if stdout { Sink::Stdout } else { Sink::File };
    generate(&Dataset::new(dataset), &config, sink)?;
    Ok(())
}

/// Run the pipeline on `dataset` and deliver the result to `sink`.
///
/// A failed run leaves the previous output file in place. A run that selects
/// no network removes it when writing to a file.
pub fn generate(dataset: &Dataset, config: &Config, sink: Sink) -> Result<Outcome> {
    let outcome = Pipeline::new(config.pipeline_options())
        .run(dataset)
        .with_context(|| format!("Failed to build blocklist from {:?}", dataset.root()))?;

    if outcome.is_empty() {
        match outcome {
            Outcome::NoMatches => warn!(
                "No geoname id found for country codes: {}",
                config.country_codes.join(",")
            ),
            Outcome::Networks(_) => warn!("No IPv4 subnet block found."),
        }
        if sink == Sink::File {
            remove_stale_output(&config.output_file)?;
        }
        return Ok(outcome);
    }

    let networks = outcome.networks();
    let rendered = outcome.render();
    match sink {
        Sink::File => {
            write_atomic(&config.output_file, rendered.as_bytes())
                .with_context(|| format!("Failed to write {:?}", config.output_file))?;
            info!(
                "{} IPv4 subnet(s) will be blocked, written to {:?}",
                format_count(networks.len() as u64),
                config.output_file
            );
        }
        Sink::Stdout => {
            let mut out = std::io::stdout().lock();
            out.write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            out.flush().context("Failed to flush stdout")?;
        }
        Sink::DryRun => {
            info!(
                "[dry-run] {} IPv4 subnet(s) would be written to {:?}",
                format_count(networks.len() as u64),
                config.output_file
            );
        }
    }

    Ok(outcome)
}

fn remove_stale_output(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed previous blocklist {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BLOCKS_IPV4_FILE, LOCATIONS_FILE};
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(LOCATIONS_FILE),
            "geoname_id,country_iso_code\n1,CU\n2,FR\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join(BLOCKS_IPV4_FILE),
            "geoname_id,network\n1,10.0.0.0/24\n2,8.0.0.0/16\n1,10.0.1.0/24\n",
        )
        .unwrap();
        temp_dir
    }

    fn config_for(dir: &TempDir, codes: &[&str]) -> Config {
        Config {
            country_codes: codes.iter().map(|c| c.to_string()).collect(),
            output_file: dir.path().join("blocked_ipv4.txt"),
            ..Config::default()
        }
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = fixture();
        let config = config_for(&dir, &["CU"]);
        generate(&Dataset::new(dir.path()), &config, Sink::File).unwrap();
        assert_eq!(
            fs::read_to_string(&config.output_file).unwrap(),
            "10.0.0.0/24\n10.0.1.0/24\n"
        );
    }

    #[test]
    fn test_generate_no_matches_writes_nothing() {
        let dir = fixture();
        let config = config_for(&dir, &["ZZ"]);
        let outcome = generate(&Dataset::new(dir.path()), &config, Sink::File).unwrap();
        assert_eq!(outcome, Outcome::NoMatches);
        assert!(!config.output_file.exists());
    }

    #[test]
    fn test_generate_no_matches_removes_previous_list() {
        let dir = fixture();
        let mut config = config_for(&dir, &["CU"]);
        generate(&Dataset::new(dir.path()), &config, Sink::File).unwrap();
        assert_eq!(
            fs::read_to_string(&config.output_file).unwrap(),
            "10.0.0.0/24\n10.0.1.0/24\n"
        );

        config.country_codes = vec!["ZZ".to_string()];
        let outcome = generate(&Dataset::new(dir.path()), &config, Sink::File).unwrap();
        assert_eq!(outcome, Outcome::NoMatches);
        assert!(!config.output_file.exists());
    }

    #[test]
    fn test_generate_without_blocks_removes_previous_list() {
        let dir = fixture();
        fs::write(
            dir.path().join(BLOCKS_IPV4_FILE),
            "geoname_id,network\n2,8.0.0.0/16\n",
        )
        .unwrap();
        let config = config_for(&dir, &["CU"]);
        fs::write(&config.output_file, "10.0.0.0/24\n").unwrap();

        let outcome = generate(&Dataset::new(dir.path()), &config, Sink::File).unwrap();
        assert_eq!(outcome, Outcome::Networks(vec![]));
        assert!(!config.output_file.exists());
    }

    #[test]
    fn test_generate_no_matches_dry_run_keeps_previous_list() {
        let dir = fixture();
        let config = config_for(&dir, &["ZZ"]);
        fs::write(&config.output_file, "10.0.0.0/24\n").unwrap();

        generate(&Dataset::new(dir.path()), &config, Sink::DryRun).unwrap();
        assert_eq!(fs::read_to_string(&config.output_file).unwrap(), "10.0.0.0/24\n");
    }

    #[test]
    fn test_generate_dry_run_writes_nothing() {
        let dir = fixture();
        let config = config_for(&dir, &["CU"]);
        let outcome = generate(&Dataset::new(dir.path()), &config, Sink::DryRun).unwrap();
        assert_eq!(outcome.networks().len(), 2);
        assert!(!config.output_file.exists());
    }

    #[test]
    fn test_generate_failure_keeps_previous_output() {
        let dir = fixture();
        fs::write(
            dir.path().join(BLOCKS_IPV4_FILE),
            "geoname_id,network\n1,999.0.0.0/24\n",
        )
        .unwrap();
        let config = config_for(&dir, &["CU"]);
        fs::write(&config.output_file, "1.0.0.0/24\n").unwrap();

        assert!(generate(&Dataset::new(dir.path()), &config, Sink::File).is_err());
        assert_eq!(fs::read_to_string(&config.output_file).unwrap(), "1.0.0.0/24\n");
    }
}
