// Seed list loading. The input is the cleaned CSV produced by the URL cleaner:
// a header row with at least `url` and `type` (or `label`) columns.

use crate::error::{CoreError, Result};
use phishcrawl_scanner::{Label, SeedEntry};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct SeedRow {
    url: String,
    #[serde(rename = "type", alias = "label")]
    label: String,
}

/// Load seeds from a CSV file
pub fn load_seeds(path: &Path) -> Result<Vec<SeedEntry>> {
    let file = File::open(path).map_err(|e| CoreError::SeedFile {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;

    read_seeds(file, &path.display().to_string())
}

/// Parse seeds from any CSV source; `source_name` is used in error messages
pub fn read_seeds<R: Read>(input: R, source_name: &str) -> Result<Vec<SeedEntry>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers = reader
        .headers()
        .map_err(|source| CoreError::SeedFile {
            path: source_name.into(),
            source,
        })?
        .clone();

    let mut seeds = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // Line 1 is the header
        let line = idx + 2;
        let record = record.map_err(|e| CoreError::InvalidSeed {
            line,
            reason: e.to_string(),
        })?;
        let row: SeedRow = record
            .deserialize(Some(&headers))
            .map_err(|e| CoreError::InvalidSeed {
                line,
                reason: e.to_string(),
            })?;

        if row.url.is_empty() {
            debug!("Skipping line {} with empty URL", line);
            continue;
        }

        seeds.push(parse_seed_row(row, line)?);
    }

    if seeds.is_empty() {
        return Err(CoreError::EmptySeeds(source_name.to_string()));
    }

    Ok(seeds)
}

fn parse_seed_row(row: SeedRow, line: usize) -> Result<SeedEntry> {
    let label: Label = row.label.parse().map_err(|_| CoreError::UnknownLabel {
        label: row.label.clone(),
        context: format!("seed line {}", line),
    })?;

    let parsed = Url::parse(&row.url).map_err(|e| CoreError::InvalidSeed {
        line,
        reason: format!("{}: {}", row.url, e),
    })?;
    if parsed.host_str().is_none() {
        return Err(CoreError::InvalidSeed {
            line,
            reason: format!("{}: no hostname", row.url),
        });
    }

    Ok(SeedEntry::new(row.url, label))
}
