//! Reads a previously written ranking CSV back into a [`Dataset`].

use crate::models::{Dataset, Row};
use crate::scraper::cleaner::{normalise_suburb, parse_rank, row_value};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Parse ranking CSV from any reader. Records that do not deserialize into a
/// [`Row`] are logged and skipped.
pub fn read_csv<R: Read>(reader: R) -> Dataset {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<Row>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Row {}: {}", i + 1, e),
        }
    }

    Dataset::from(rows)
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    debug!("Loading rankings from {:?}", path);

    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {:?}", path))?;
    let data = read_csv(file);

    debug!("{} rows loaded", data.len());
    Ok(data)
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// A row whose median reads as a dollar figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedSuburb {
    pub rank: String,
    pub suburb: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub suburbs: usize,
    /// Rows with a parseable median.
    pub priced: usize,
    pub highest: Option<PricedSuburb>,
    pub lowest: Option<PricedSuburb>,
}

/// Count rows and pick the dearest and cheapest priced suburbs. Ties go to
/// the row listed first.
pub fn summarise(data: &Dataset) -> Summary {
    let priced: Vec<PricedSuburb> = data
        .rows()
        .iter()
        .filter_map(|r| {
            row_value(r).map(|value| PricedSuburb {
                rank: parse_rank(&r.rank)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| r.rank.trim().to_string()),
                suburb: normalise_suburb(&r.suburb),
                value,
            })
        })
        .collect();

    let mut highest: Option<&PricedSuburb> = None;
    let mut lowest: Option<&PricedSuburb> = None;
    for p in &priced {
        if highest.is_none_or(|h| p.value > h.value) {
            highest = Some(p);
        }
        if lowest.is_none_or(|l| p.value < l.value) {
            lowest = Some(p);
        }
    }

    Summary {
        suburbs: data.len(),
        priced: priced.len(),
        highest: highest.cloned(),
        lowest: lowest.cloned(),
    }
}
