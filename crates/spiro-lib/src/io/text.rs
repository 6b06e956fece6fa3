use anyhow::{Context, Result};
use std::path::Path;

/// Parse a voltage capture written one sample per line or as comma/whitespace
/// separated values. Blank lines and `#` comments are ignored.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        for token in trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let val: f64 = token
                .parse()
                .with_context(|| format!("line {} is not f64: {}", idx + 1, token))?;
            out.push(val);
        }
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a voltage capture from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

/// Newline-delimited rendering used when handing series to other tools.
pub fn format_f64_series(data: &[f64]) -> String {
    let mut out = String::with_capacity(data.len() * 8);
    for v in data {
        out.push_str(&v.to_string());
        out.push('\n');
    }
    out
}
