use std::path::Path;

use roomsense_core::Reading;

use crate::store::PartitionStore;

/// Loads every reading of today's partition in append order. A missing file
/// or a failed read both come back as an empty history; the dashboard shows
/// its placeholder instead of crashing.
pub fn load_current_partition(store: &PartitionStore) -> Vec<Reading> {
    let path = store.today_path();
    if !path.exists() {
        return Vec::new();
    }

    match read_partition(&path) {
        Ok(readings) => readings,
        Err(e) => {
            log::error!("Could not read the partition file: {e}");
            Vec::new()
        }
    }
}

fn read_partition(path: &Path) -> Result<Vec<Reading>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader.deserialize().collect()
}
