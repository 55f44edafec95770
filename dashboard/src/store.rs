use std::{
    error::Error,
    fs::{self, OpenOptions},
    path::PathBuf,
};

use chrono::NaiveDate;
use roomsense_core::Reading;

/// Append-only store over one CSV file per calendar date.
///
/// Only the ingestion thread writes, and every write is an append, so
/// records cannot be lost to concurrent rewrites.
pub struct PartitionStore {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl PartitionStore {
    pub fn new(dir: PathBuf, prefix: String, extension: String) -> Self {
        Self {
            dir,
            prefix,
            extension,
        }
    }

    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            self.prefix,
            date.format("%Y-%m-%d"),
            self.extension
        ))
    }

    pub fn today_path(&self) -> PathBuf {
        self.partition_path(chrono::Local::now().date_naive())
    }

    /// Appends one reading to today's partition, creating the storage
    /// directory and the file (with its header row) as needed. Failures are
    /// logged and reported as `false`, never raised.
    pub fn append(&self, reading: &Reading) -> bool {
        match self.try_append(reading) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Could not append to the partition file: {e}");
                false
            }
        }
    }

    fn try_append(&self, reading: &Reading) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&self.dir)?;

        let path = self.today_path();
        let write_header = !path.exists();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(reading)?;
        writer.flush()?;

        Ok(())
    }
}
