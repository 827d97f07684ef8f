//! File encoders for a [`Dataset`].
//!
//! Each writer is a plain serializer: header row (or keys) from
//! [`Dataset::columns`], one row per record, every value as text. None of them
//! know about merging or deduplication.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use indexmap::IndexMap;
use log::warn;
use rust_xlsxwriter::Workbook;
use tempfile::NamedTempFile;

use crate::config::OutputPaths;
use crate::{info_time, Dataset, Record, Result};

/// Writes the dataset to all three outputs, replacing previous contents.
///
/// Every file is first encoded next to its target and only renamed into place
/// once all three encoded, so a failing encoder leaves the old outputs intact.
pub fn write_all(dataset: &Dataset, paths: &OutputPaths) -> Result<()> {
    let start_time = Local::now();
    if dataset.is_empty() {
        warn!("Writing an empty dataset, outputs will hold headers only");
    }

    let csv = stage(&paths.csv, |path| write_csv(dataset, path))?;
    let xlsx = stage(&paths.xlsx, |path| write_xlsx(dataset, path))?;
    let json = stage(&paths.json, |path| write_json(dataset, path))?;
    for (staged, target) in [(csv, &paths.csv), (xlsx, &paths.xlsx), (json, &paths.json)] {
        staged.persist(target).map_err(|e| e.error)?;
    }

    info_time!(
        start_time,
        "Wrote {} rows to {}, {}, {}",
        dataset.len(),
        paths.csv.display(),
        paths.xlsx.display(),
        paths.json.display()
    );
    Ok(())
}

/// Encodes into a temporary file in the target's directory. The file is
/// removed on drop unless persisted.
fn stage(target: &Path, encode: impl FnOnce(&Path) -> Result<()>) -> Result<NamedTempFile> {
    ensure_parent(target)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = target
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let staged = tempfile::Builder::new()
        .prefix(".denue-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    encode(staged.path())?;
    Ok(staged)
}

pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_xlsx(dataset: &Dataset, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in dataset.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (row_idx, row) in dataset.rows().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, value) in row.into_iter().enumerate() {
            // Empty cells are left blank, as a spreadsheet export would.
            if !value.is_empty() {
                worksheet.write_string(row_num, col as u16, value)?;
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// Pretty-printed array of objects; keys follow the column order.
pub fn write_json(dataset: &Dataset, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let columns = dataset.columns();
    let objects: Vec<IndexMap<&str, &str>> = dataset
        .rows()
        .map(|row| columns.iter().map(String::as_str).zip(row).collect())
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &objects)?;
    writer.flush()?;
    Ok(())
}

/// Reads back a CSV written by [`write_csv`]. Header names are lower-cased.
pub fn read_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(headers.iter().zip(row.iter()).collect());
    }
    Ok(records)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
