//! Durable record store for the ponto time clock.
//!
//! Finished sessions are kept in a single CSV table whose first row is the
//! fixed header [`COLUMNS`]. The store is append-only: rows are never edited
//! or removed once written.
//!
//! # Persistence
//!
//! Every append rewrites the whole table to a sibling temp file and renames it
//! over the store, so a crash mid-write never leaves a truncated table. While
//! writing, an exclusive advisory lock is held on `<store>.lock`; if another
//! process holds it the append fails with [`StoreError::Locked`].
//!
//! # Stale tables
//!
//! A table whose header does not match [`COLUMNS`] exactly is stale. What
//! happens to it is chosen by [`StaleStorePolicy`]; every repair is logged at
//! `warn` level and kept on the store (see [`RecordStore::repair`]) because it
//! drops historical rows from the live table.
//!
//! Under a matching header, existing rows are carried over verbatim. A row
//! with missing or extra fields (e.g. after a hand edit) is written back as it
//! was found and never blocks new appends.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use fs2::FileExt;
use ponto_core::{FinishedRecord, RecordSink, SinkError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header row of the record table, in order.
pub const COLUMNS: [&str; 5] = [
    "USER_NAME",
    "RECORD_DATE",
    "SHIFT_START_TIME",
    "SHIFT_END_TIME",
    "TOTAL_WORKED_DURATION",
];

/// Record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// Another process holds the store lock (e.g. the table is open elsewhere).
    #[error("record store {} is locked by another process", .path.display())]
    Locked { path: PathBuf },
    /// The table header is wrong and the policy forbids repairing it.
    #[error("record store {} has unexpected header {found:?}", .path.display())]
    StaleHeader { path: PathBuf, found: Vec<String> },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What to do with a table whose header does not match [`COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleStorePolicy {
    /// Discard the table and start an empty one. Old rows are lost.
    Recreate,
    /// Move the table aside to `<stem>.stale-<timestamp>.<ext>`, then start an empty one.
    #[default]
    Backup,
    /// Refuse to open the store.
    Fail,
}

/// Record of a stale-header repair performed at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRepair {
    /// Header found in the stale table.
    pub found: Vec<String>,
    /// Data rows the live table lost.
    pub discarded_rows: usize,
    /// Where the stale table was moved, if it was kept.
    pub backup: Option<PathBuf>,
}

/// One row of the record table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub user_name: String,
    pub record_date: String,
    pub shift_start_time: String,
    pub shift_end_time: String,
    pub total_worked_duration: String,
}

impl From<&FinishedRecord> for RecordRow {
    fn from(record: &FinishedRecord) -> Self {
        Self {
            user_name: record.display_name.clone(),
            record_date: record.record_date_text(),
            shift_start_time: record.shift_start_text(),
            shift_end_time: record.shift_end_text(),
            total_worked_duration: record.total_worked_text(),
        }
    }
}

impl From<&RecordRow> for csv::StringRecord {
    fn from(row: &RecordRow) -> Self {
        Self::from(vec![
            row.user_name.as_str(),
            row.record_date.as_str(),
            row.shift_start_time.as_str(),
            row.shift_end_time.as_str(),
            row.total_worked_duration.as_str(),
        ])
    }
}

/// Raw table as read from disk, before the header is checked.
struct Table {
    header: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

/// Append-only table of finished records backed by a CSV file.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    rows: Vec<csv::StringRecord>,
    /// Number of leading `rows` known to be on disk.
    durable: usize,
    repair: Option<HeaderRepair>,
}

impl RecordStore {
    /// Opens the store at `path`, creating it (and its parent directory) if needed.
    ///
    /// A missing or empty file becomes a new table holding only the header.
    /// A table with a different header is handled according to `policy`.
    pub fn open_or_create(path: &Path, policy: StaleStorePolicy) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let mut store = Self {
            path: path.to_path_buf(),
            rows: Vec::new(),
            durable: 0,
            repair: None,
        };

        let Some(table) = read_table(path)? else {
            store.persist()?;
            tracing::info!(path = %path.display(), "created record store");
            return Ok(store);
        };

        if table.header == COLUMNS {
            let irregular = table
                .rows
                .iter()
                .filter(|row| row.len() != COLUMNS.len())
                .count();
            if irregular > 0 {
                tracing::warn!(
                    path = %path.display(),
                    irregular,
                    "record store has rows with an unexpected field count; keeping them as-is"
                );
            }
            store.rows = table.rows;
            store.durable = store.rows.len();
            tracing::debug!(path = %path.display(), rows = store.rows.len(), "opened record store");
            return Ok(store);
        }

        let backup = match policy {
            StaleStorePolicy::Fail => {
                tracing::error!(
                    path = %path.display(),
                    found = ?table.header,
                    expected = ?COLUMNS,
                    "record store header does not match; refusing to open"
                );
                return Err(StoreError::StaleHeader {
                    path: path.to_path_buf(),
                    found: table.header,
                });
            }
            StaleStorePolicy::Backup => {
                let backup = backup_path(path);
                fs::rename(path, &backup).map_err(|e| StoreError::io(path, e))?;
                Some(backup)
            }
            StaleStorePolicy::Recreate => None,
        };

        store.persist()?;
        tracing::warn!(
            path = %path.display(),
            found = ?table.header,
            expected = ?COLUMNS,
            discarded_rows = table.rows.len(),
            backup = ?backup,
            "record store header does not match; recreated an empty store"
        );
        store.repair = Some(HeaderRepair {
            found: table.header,
            discarded_rows: table.rows.len(),
            backup,
        });
        Ok(store)
    }

    /// Appends a finished record and persists the table.
    ///
    /// On error the row stays in [`rows`](Self::rows) but is not counted as
    /// durable; the next append drops it before adding its own row.
    pub fn append(&mut self, record: &FinishedRecord) -> Result<(), StoreError> {
        self.rows.truncate(self.durable);
        self.rows
            .push(csv::StringRecord::from(&RecordRow::from(record)));
        self.persist()?;
        self.durable = self.rows.len();
        tracing::debug!(path = %self.path.display(), rows = self.durable, "appended record");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows in the live table, including any whose persist failed.
    pub fn rows(&self) -> &[csv::StringRecord] {
        &self.rows
    }

    /// Number of rows known to be on disk.
    pub const fn durable_len(&self) -> usize {
        self.durable
    }

    /// The stale-header repair performed when this store was opened, if any.
    pub const fn repair(&self) -> Option<&HeaderRepair> {
        self.repair.as_ref()
    }

    /// Path of the advisory lock file guarding writes.
    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.path, ".lock")
    }

    fn persist(&self) -> Result<(), StoreError> {
        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        FileExt::try_lock_exclusive(&lock).map_err(|e| {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                StoreError::Locked {
                    path: self.path.clone(),
                }
            } else {
                StoreError::io(&lock_path, e)
            }
        })?;

        let tmp = sibling(&self.path, ".tmp");
        self.write_table(&tmp)?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;

        // Dropping the handle would release the lock too; unlocking explicitly
        // reports failures instead of swallowing them.
        FileExt::unlock(&lock).map_err(|e| StoreError::io(&lock_path, e))
    }

    fn write_table(&self, target: &Path) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(target)
            .map_err(|e| StoreError::csv(target, e))?;
        writer
            .write_record(COLUMNS)
            .map_err(|e| StoreError::csv(target, e))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| StoreError::csv(target, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(target, e))?;
        File::open(target)
            .and_then(|f| f.sync_all())
            .map_err(|e| StoreError::io(target, e))
    }
}

impl RecordSink for RecordStore {
    fn append(&mut self, record: &FinishedRecord) -> Result<(), SinkError> {
        Self::append(self, record).map_err(Into::into)
    }
}

/// Reads the table at `path`. `None` when the file is missing or empty.
fn read_table(path: &Path) -> Result<Option<Table>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let mut records = reader.records();

    let header = match records.next() {
        None => return Ok(None),
        Some(first) => first.map_err(|e| StoreError::csv(path, e))?,
    };
    let rows = records
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::csv(path, e))?;

    Ok(Some(Table {
        header: header.iter().map(str::to_string).collect(),
        rows,
    }))
}

/// `records.csv` + `suffix` -> `records.csv<suffix>`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// `records.csv` -> `records.stale-20250310091500.csv`.
fn backup_path(path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let stem = path
        .file_stem()
        .map_or_else(|| "records".into(), |s| s.to_string_lossy());
    let name = match path.extension() {
        Some(ext) => format!("{stem}.stale-{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}.stale-{stamp}"),
    };
    path.with_file_name(name)
}
