use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

/// Read one numeric column from a CSV capture export.
///
/// The column is matched case-insensitively against the header row. Rows
/// with an empty cell in that column are skipped.
pub fn read_voltage_column(path: &Path, column: &str, delimiter: u8) -> Result<Vec<f64>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_voltage_column(file, column, delimiter)
        .with_context(|| format!("reading column '{}' from {}", column, path.display()))
}

pub fn parse_voltage_column<R: Read>(reader: R, column: &str, delimiter: u8) -> Result<Vec<f64>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers().context("reading header")?.clone();
    let idx = locate_column(&headers, column)?;

    let mut samples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading record {}", row + 1))?;
        let Some(cell) = record.get(idx).filter(|c| !c.is_empty()) else {
            continue;
        };
        let value = cell
            .parse::<f64>()
            .with_context(|| format!("record {} column '{}' is not f64: {}", row + 1, column, cell))?;
        samples.push(value);
    }
    if samples.is_empty() {
        anyhow::bail!("column '{}' holds no samples", column);
    }
    Ok(samples)
}

fn locate_column(headers: &StringRecord, requested: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(requested))
        .ok_or_else(|| {
            let available: Vec<&str> = headers.iter().collect();
            anyhow!(
                "column '{}' not found (available: {})",
                requested,
                available.join(", ")
            )
        })
}
