use std::collections::HashSet;
use std::path::Path;

use log::{info, warn};

use crate::config::OutputPaths;
use crate::export::{read_csv, write_all};
use crate::{Dataset, Record, Result};

/// Concatenates `previous` and `current` and drops every record whose `id`
/// was already seen, so the first occurrence wins. Records without an `id`
/// share the empty id.
pub fn merge_records(previous: Vec<Record>, current: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    previous
        .into_iter()
        .chain(current)
        .filter(|record| seen.insert(record.id().unwrap_or_default().to_string()))
        .collect()
}

/// Loads the dataset persisted by an earlier run.
///
/// A missing file is an empty history. An unreadable one is also treated as
/// empty, with a warning, since the run is about to overwrite it.
pub fn load_previous(path: &Path) -> Vec<Record> {
    if !path.exists() {
        info!("No previous dataset at {}. Starting fresh.", path.display());
        return Vec::new();
    }
    match read_csv(path) {
        Ok(records) => {
            info!(
                "Loaded {} previously saved records from {}",
                records.len(),
                path.display()
            );
            records
        }
        Err(e) => {
            warn!(
                "Couldn't read previous dataset {}: {e}. Its records will be lost when the outputs are rewritten.",
                path.display()
            );
            Vec::new()
        }
    }
}

/// Folds `current` into the history kept in `paths.csv` and rewrites all
/// three outputs with the deduplicated result.
pub fn merge_and_persist(current: Vec<Record>, paths: &OutputPaths) -> Result<Dataset> {
    let previous = load_previous(&paths.csv);
    let incoming = previous.len() + current.len();
    let merged = merge_records(previous, current);
    if merged.len() < incoming {
        info!("Dropped {} duplicate records", incoming - merged.len());
    }

    let dataset = Dataset::new(merged);
    write_all(&dataset, paths)?;
    Ok(dataset)
}
