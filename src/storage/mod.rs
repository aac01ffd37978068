use crate::models::{CSV_HEADERS, Dataset};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Serialize `data` as CSV: the header line, then one line per row in order.
/// The header is always written, even for an empty dataset.
pub fn write_csv<W: Write>(writer: W, data: &Dataset) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS)?;
    for row in data.rows() {
        wtr.serialize(row)
            .with_context(|| format!("serialize row {:?}", row.rank))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the dataset to `path`, replacing any existing file.
pub fn save_dataset(path: &Path, data: &Dataset) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Could not create {:?}", path))?;
    write_csv(file, data).with_context(|| format!("Could not write {:?}", path))?;

    info!("Wrote {} rows to {:?}", data.len(), path);
    Ok(())
}
