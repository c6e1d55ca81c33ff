//! CSV table reader for the GeoLite2 dataset.
//!
//! A [`Table`] reads the header row eagerly and then yields data rows lazily,
//! in file order. Every data row must have the same number of fields as the
//! header; a ragged row is reported as [`EmbargoError::MalformedTable`] with
//! the 1-based index of the offending data row.

use csv::{ErrorKind, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{EmbargoError, Result};

/// Column names shared by a table and all of its rows.
#[derive(Debug)]
struct Header {
    path: PathBuf,
    names: Vec<String>,
}

impl Header {
    fn position(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|name| name == column)
    }

    fn missing(&self, column: &str) -> EmbargoError {
        EmbargoError::MissingColumn {
            path: self.path.clone(),
            column: column.to_string(),
        }
    }
}

/// Anything that exposes string fields by column name.
pub trait Record {
    fn field(&self, column: &str) -> Result<&str>;
}

/// A delimited table with a header row.
pub struct Table<R = File> {
    header: Rc<Header>,
    records: StringRecordsIntoIter<R>,
}

impl Table<File> {
    /// Open a table from disk. A missing file is [`EmbargoError::MissingTable`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EmbargoError::MissingTable(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| EmbargoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, file)
    }
}

impl<R: Read> Table<R> {
    /// Build a table from any reader. `label` is used in error messages.
    pub fn from_reader<P: Into<PathBuf>>(label: P, reader: R) -> Result<Self> {
        let path = label.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let names = reader
            .headers()
            .map_err(|e| malformed(&path, 0, e))?
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').to_string())
            .collect();

        Ok(Self {
            header: Rc::new(Header { path, names }),
            records: reader.into_records(),
        })
    }

    /// Fail with [`EmbargoError::MissingColumn`] unless every column is present.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        match columns
            .iter()
            .find(|column| self.header.position(column).is_none())
        {
            Some(column) => Err(self.header.missing(column)),
            None => Ok(()),
        }
    }

    pub fn rows(self) -> Rows<R> {
        Rows {
            header: self.header,
            records: self.records,
            index: 0,
        }
    }
}

/// Lazy iterator over the data rows of a [`Table`].
pub struct Rows<R> {
    header: Rc<Header>,
    records: StringRecordsIntoIter<R>,
    index: u64,
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.index += 1;
        Some(
            record
                .map(|record| Row {
                    header: Rc::clone(&self.header),
                    record,
                })
                .map_err(|e| malformed(&self.header.path, self.index, e)),
        )
    }
}

/// One data row, addressable by column name.
#[derive(Debug, Clone)]
pub struct Row {
    header: Rc<Header>,
    record: StringRecord,
}

impl Row {
    pub fn get(&self, column: &str) -> Result<&str> {
        self.header
            .position(column)
            .and_then(|i| self.record.get(i))
            .ok_or_else(|| self.header.missing(column))
    }
}

impl Record for Row {
    fn field(&self, column: &str) -> Result<&str> {
        self.get(column)
    }
}

/// A row of `GeoLite2-Country-Locations-*.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRow {
    pub geoname_id: String,
    pub country_iso_code: String,
}

impl LocationRow {
    pub const COLUMNS: &'static [&'static str] = &["geoname_id", "country_iso_code"];
}

impl TryFrom<Row> for LocationRow {
    type Error = EmbargoError;

    fn try_from(row: Row) -> Result<Self> {
        Ok(Self {
            geoname_id: row.get("geoname_id")?.to_string(),
            country_iso_code: row.get("country_iso_code")?.to_string(),
        })
    }
}

impl Record for LocationRow {
    fn field(&self, column: &str) -> Result<&str> {
        match column {
            "geoname_id" => Ok(&self.geoname_id),
            "country_iso_code" => Ok(&self.country_iso_code),
            _ => Err(EmbargoError::MissingColumn {
                path: PathBuf::from("<location row>"),
                column: column.to_string(),
            }),
        }
    }
}

/// A row of `GeoLite2-Country-Blocks-IPv4.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    pub geoname_id: String,
    pub network: String,
}

impl BlockRow {
    pub const COLUMNS: &'static [&'static str] = &["geoname_id", "network"];
}

impl TryFrom<Row> for BlockRow {
    type Error = EmbargoError;

    fn try_from(row: Row) -> Result<Self> {
        Ok(Self {
            geoname_id: row.get("geoname_id")?.to_string(),
            network: row.get("network")?.to_string(),
        })
    }
}

impl Record for BlockRow {
    fn field(&self, column: &str) -> Result<&str> {
        match column {
            "geoname_id" => Ok(&self.geoname_id),
            "network" => Ok(&self.network),
            _ => Err(EmbargoError::MissingColumn {
                path: PathBuf::from("<block row>"),
                column: column.to_string(),
            }),
        }
    }
}

/// Open `path`, check it carries the columns of `T`, and map every row into `T`.
pub fn read_typed<T>(path: &Path, columns: &[&str]) -> Result<impl Iterator<Item = Result<T>>>
where
    T: TryFrom<Row, Error = EmbargoError>,
{
    let table = Table::open(path)?;
    table.require_columns(columns)?;
    Ok(table.rows().map(|row| row.and_then(T::try_from)))
}

fn malformed(path: &Path, row: u64, err: csv::Error) -> EmbargoError {
    let reason = match err.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        ErrorKind::Io(e) => e.to_string(),
        _ => err.to_string(),
    };
    EmbargoError::MalformedTable {
        path: path.to_path_buf(),
        row,
        reason,
    }
}
