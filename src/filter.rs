//! Column filter used to realize the two-hop join
//! (country code -> geoname id -> network).

use std::collections::HashSet;

use crate::error::Result;
use crate::table::Record;

/// Collect the `get_key` value of every row whose `search_key` value is in `accepted`.
///
/// Order follows the input rows. Duplicates are kept. The first row error
/// (malformed row, missing column) aborts the scan.
pub fn extract<I, T>(
    rows: I,
    search_key: &str,
    accepted: &HashSet<String>,
    get_key: &str,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = Result<T>>,
    T: Record,
{
    let mut result = Vec::new();
    for row in rows {
        let row = row?;
        let key = row.field(search_key)?;
        let value = row.field(get_key)?;
        if accepted.contains(key) {
            result.push(value.to_string());
        }
    }
    Ok(result)
}
