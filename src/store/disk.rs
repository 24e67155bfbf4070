//! CSV-backed store with atomic full-table rewrites.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::{RateRecord, RateTable};
use crate::store::{RateStore, to_csv};
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

pub struct CsvStore {
    path: PathBuf,
    /// Serializes the read-modify-write of `merge_and_save`; concurrent
    /// saves would otherwise drop each other's rows.
    write_lock: Mutex<()>,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_table(&self) -> Result<RateTable, RateError> {
        if !self.path.exists() {
            debug!("No persisted rates at {}, starting empty", self.path.display());
            return Ok(RateTable::new());
        }

        let file = File::open(&self.path).map_err(RateError::persistence)?;
        let mut reader = csv::Reader::from_reader(file);
        let mut table = RateTable::new();
        for row in reader.deserialize() {
            let record: RateRecord = row.map_err(RateError::persistence)?;
            table.upsert(record);
        }
        Ok(table)
    }

    /// Full rewrite through a temp file in the destination directory,
    /// finished with an atomic rename. A crash mid-write leaves the previous
    /// artifact untouched.
    fn write_table(&self, table: &RateTable) -> Result<(), RateError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).map_err(RateError::persistence)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(RateError::persistence)?;
        tmp.write_all(to_csv(table)?.as_bytes())
            .map_err(RateError::persistence)?;
        tmp.persist(&self.path).map_err(RateError::persistence)?;
        Ok(())
    }
}

#[async_trait]
impl RateStore for CsvStore {
    async fn load(&self) -> Result<RateTable, RateError> {
        self.read_table()
    }

    async fn merge_and_save(&self, incoming: RateTable) -> Result<RateTable, RateError> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.read_table()?;
        table.merge(incoming);
        self.write_table(&table)?;
        debug!(
            "Persisted {} rate records to {}",
            table.len(),
            self.path.display()
        );
        Ok(table)
    }

    async fn export_subset(&self, codes: &[CurrencyCode]) -> Result<String, RateError> {
        let table = self.read_table()?;
        to_csv(&table.filter_codes(codes))
    }
}
