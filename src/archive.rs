//! Archive extraction and dataset discovery.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Unpack the zip archive at `zip_path` into `extract_dir`, creating it if
/// needed, and return the dataset root.
///
/// The root is the single top-level directory shared by every entry of the
/// archive (GeoLite2 ships one dated directory such as
/// `GeoLite2-Country-CSV_20240102`). Entries at the top level, or spread over
/// several directories, make `extract_dir` itself the root. Older dated
/// directories from previous runs are removed once the new one is in place.
pub fn extract(zip_path: &Path, extract_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(extract_dir)
        .with_context(|| format!("Failed to create extract directory {:?}", extract_dir))?;

    let file =
        File::open(zip_path).with_context(|| format!("Failed to open archive {:?}", zip_path))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Invalid zip archive {:?}", zip_path))?;

    let top_dir = common_top_dir(archive.file_names());

    info!(
        "Extracting {} file(s) from {:?}",
        archive.len(),
        zip_path.file_name().unwrap_or_default()
    );
    archive
        .extract(extract_dir)
        .with_context(|| format!("Failed to extract archive into {:?}", extract_dir))?;

    let root = match top_dir {
        Some(name) => {
            prune_previous(extract_dir, &name)?;
            extract_dir.join(name)
        }
        None => extract_dir.to_path_buf(),
    };
    debug!("Dataset root: {:?}", root);
    Ok(root)
}

/// The first path component every entry shares, if all entries live under it.
fn common_top_dir<'a>(names: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut top: Option<&str> = None;
    for name in names {
        let mut components = Path::new(name).components();
        let first = match components.next() {
            Some(Component::Normal(first)) => first.to_str()?,
            _ => return None,
        };
        // A plain file at the top level
        if components.next().is_none() && !name.ends_with('/') {
            return None;
        }
        match top {
            None => top = Some(first),
            Some(seen) if seen == first => {}
            Some(_) => return None,
        }
    }
    top.map(str::to_string)
}

/// Remove sibling directories that differ from `current` only in their
/// trailing digits, e.g. `GeoLite2-Country-CSV_20230101`.
fn prune_previous(extract_dir: &Path, current: &str) -> Result<()> {
    let stem = current.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.is_empty() || stem == current {
        return Ok(());
    }

    let entries = fs::read_dir(extract_dir)
        .with_context(|| format!("Failed to read extract directory {:?}", extract_dir))?;
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let dated = name
            .strip_prefix(stem)
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()));
        if dated && name != current && path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove old dataset {:?}", path))?;
            info!("Removed old dataset {:?}", path);
        }
    }
    Ok(())
}
