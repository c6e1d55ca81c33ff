//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "embargo")]
#[command(author, version, about = "Country IPv4 blocklist builder from GeoLite2 CSV data")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (defaults are used when it does not exist)
    #[arg(long, default_value = "/etc/embargo/config.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, alias = "debug", short_alias = 'd', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the dataset, extract it and write the blocklist
    Update {
        /// Source archive URL
        #[arg(short, long)]
        url: Option<String>,

        /// Directory to extract the archive into
        #[arg(short = 'x', long)]
        extract_dir: Option<PathBuf>,

        #[command(flatten)]
        selection: Selection,

        /// Build the list but do not write the output file
        #[arg(long)]
        dry_run: bool,
    },

    /// Build the blocklist from an already extracted dataset directory
    Build {
        /// Directory holding the GeoLite2 CSV tables
        dataset: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Print the list to stdout instead of writing the output file
        #[arg(long)]
        stdout: bool,
    },

    /// Print the effective configuration as YAML
    Config,

    /// Show version
    Version,
}

/// Options shared by `update` and `build`
#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
    /// Blocked IPv4 CIDR list file
    #[arg(short = 'f', long = "blocked-ip-file")]
    pub output: Option<PathBuf>,

    /// Comma-separated country codes, e.g. "CU,IR,KP,SD,SY"
    #[arg(short, long, value_delimiter = ',', value_parser = parse_code_arg)]
    pub country_codes: Option<Vec<String>>,

    /// Sort by largest to smallest CIDR block size
    #[arg(short = 'S', long)]
    pub cidr_sorting: bool,

    /// Merge contiguous networks into larger blocks
    #[arg(short, long)]
    pub aggregate: bool,
}

impl Selection {
    /// Overlay command-line choices on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref output) = self.output {
            config.output_file = output.clone();
        }
        if let Some(ref codes) = self.country_codes {
            config.country_codes = codes.clone();
        }
        config.cidr_sorting |= self.cidr_sorting;
        config.aggregate |= self.aggregate;
    }
}

fn parse_code_arg(value: &str) -> Result<String, String> {
    let code = value.trim();
    if code.is_empty() {
        return Err("empty country code".to_string());
    }
    Ok(code.to_string())
}
