//! The join-filter-sort pipeline.
//!
//! ```text
//! Locations.csv --country codes--> geoname ids
//! Blocks-IPv4.csv --geoname ids--> CIDR strings --> sort --> dedup
//!     --> [aggregate] --> [group by prefix] --> output
//! ```
//!
//! Each phase runs to completion before the next one starts; the first error
//! aborts the run.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::aggregator::{aggregate, count_ips, coverage_percent, deduplicate, group_by_prefix};
use crate::error::Result;
use crate::filter::extract;
use crate::network::{sort_networks, NetworkAddress};
use crate::table::{read_typed, BlockRow, LocationRow};
use crate::utils::format_count;

pub const LOCATIONS_FILE: &str = "GeoLite2-Country-Locations-en.csv";
pub const BLOCKS_IPV4_FILE: &str = "GeoLite2-Country-Blocks-IPv4.csv";

/// An extracted GeoLite2 Country CSV directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
}

impl Dataset {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locations_path(&self) -> PathBuf {
        self.root.join(LOCATIONS_FILE)
    }

    pub fn blocks_path(&self) -> PathBuf {
        self.root.join(BLOCKS_IPV4_FILE)
    }
}

/// What to select and how to order it.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// ISO 3166-1 alpha-2 codes, matched case-sensitively
    pub country_codes: BTreeSet<String>,
    /// Emit largest blocks first instead of pure address order
    pub group_by_prefix: bool,
    /// Merge contiguous networks before ordering
    pub aggregate: bool,
}

impl PipelineOptions {
    pub fn new<I, S>(country_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            country_codes: country_codes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn group_by_prefix(mut self, enabled: bool) -> Self {
        self.group_by_prefix = enabled;
        self
    }

    pub fn aggregate(mut self, enabled: bool) -> Self {
        self.aggregate = enabled;
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No location matched the configured country codes
    NoMatches,
    /// Ordered networks, possibly empty when no block references the matched locations
    Networks(Vec<NetworkAddress>),
}

impl Outcome {
    pub fn networks(&self) -> &[NetworkAddress] {
        match self {
            Outcome::NoMatches => &[],
            Outcome::Networks(networks) => networks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.networks().is_empty()
    }

    /// One CIDR per line, each terminated by `\n`.
    pub fn render(&self) -> String {
        self.networks()
            .iter()
            .map(|n| format!("{}\n", n))
            .collect()
    }
}

pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, dataset: &Dataset) -> Result<Outcome> {
        let accepted: HashSet<String> = self.options.country_codes.iter().cloned().collect();

        let locations = dataset.locations_path();
        info!("Reading locations from {}", locations.display());
        let geoname_ids = extract(
            read_typed::<LocationRow>(&locations, LocationRow::COLUMNS)?,
            "country_iso_code",
            &accepted,
            "geoname_id",
        )?;

        if geoname_ids.is_empty() {
            info!(
                "No geoname id found for country codes: {}",
                join_codes(&self.options.country_codes)
            );
            return Ok(Outcome::NoMatches);
        }
        debug!("{} geoname id(s) matched", geoname_ids.len());

        let blocks = dataset.blocks_path();
        info!("Reading IPv4 blocks from {}", blocks.display());
        let geoname_ids: HashSet<String> = geoname_ids.into_iter().collect();
        let cidrs = extract(
            read_typed::<BlockRow>(&blocks, BlockRow::COLUMNS)?,
            "geoname_id",
            &geoname_ids,
            "network",
        )?;
        debug!("{} block(s) matched", format_count(cidrs.len() as u64));

        let networks = self.order(sort_networks(&cidrs)?);

        let total_ips = count_ips(&networks);
        info!(
            "{} IPv4 subnet(s) selected ({} IPs, {:.2}% of IPv4 space)",
            format_count(networks.len() as u64),
            format_count(total_ips),
            coverage_percent(total_ips)
        );

        Ok(Outcome::Networks(networks))
    }

    /// Post-sort stages, in order: dedup, optional aggregate, optional grouping.
    fn order(&self, sorted: Vec<NetworkAddress>) -> Vec<NetworkAddress> {
        let before = sorted.len();
        let mut networks = deduplicate(sorted);
        if networks.len() != before {
            debug!("Removed {} duplicate network(s)", before - networks.len());
        }

        if self.options.aggregate {
            let merged = aggregate(&networks);
            info!(
                "Aggregated {} networks -> {} ranges",
                format_count(networks.len() as u64),
                format_count(merged.len() as u64)
            );
            networks = merged;
        }

        if self.options.group_by_prefix {
            networks = group_by_prefix(&networks);
        }

        networks
    }
}

fn join_codes(codes: &BTreeSet<String>) -> String {
    codes.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}
