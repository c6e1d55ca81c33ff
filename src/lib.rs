//! # embargo - Country IPv4 blocklists from GeoLite2 data
//!
//! Builds a deduplicated, numerically ordered list of IPv4 CIDR blocks
//! belonging to a set of countries, from the MaxMind GeoLite2 Country CSV
//! archive. The output is a flat file, one CIDR per line, ready for
//! firewall/ACL tooling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        embargo                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, build, config, version             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Country codes, URL, extract dir, output file         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls) -> Archive (zip)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pipeline                                                   │
//! │    ├── Table reader (csv)                                   │
//! │    ├── Filter: country -> geoname id -> network             │
//! │    ├── Network parse + numeric sort (ipnet)                 │
//! │    └── Dedup, aggregate, group by prefix                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Output (atomic write via tempfile)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use embargo::pipeline::{Dataset, Outcome, Pipeline, PipelineOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let dataset = Dataset::new("/tmp/embargo_cache/GeoLite2-Country-CSV_20240102");
//!     let options = PipelineOptions::new(["CU", "IR"]).group_by_prefix(true);
//!
//!     match Pipeline::new(options).run(&dataset)? {
//!         Outcome::NoMatches => println!("no location matched"),
//!         outcome => print!("{}", outcome.render()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Dedup, prefix grouping and CIDR aggregation
//! - [`archive`] - Zip extraction and dataset discovery
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Pipeline error types
//! - [`fetcher`] - HTTP client for downloading the dataset archive
//! - [`filter`] - Column filter used for the two-hop join
//! - [`lock`] - File locking for concurrent execution prevention
//! - [`network`] - IPv4 network parsing and ordering
//! - [`output`] - Atomic file output
//! - [`pipeline`] - The join-filter-sort pipeline
//! - [`table`] - CSV table reader
//! - [`utils`] - Formatting helpers

pub mod aggregator;
pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod lock;
pub mod network;
pub mod output;
pub mod pipeline;
pub mod table;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::EmbargoError;
pub use network::NetworkAddress;
pub use pipeline::{Dataset, Outcome, Pipeline, PipelineOptions};
