use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};

use crate::declare::PriceRow;

const HIGH_COLUMN: usize = 2;
const LOW_COLUMN: usize = 3;

/// Parses a history CSV body and returns the mean of (high + low) / 2 over
/// every data row.
///
/// The first line is the header. Any row whose high or low cannot be parsed
/// fails the whole body, and a body without data rows is an error instead
/// of a NaN average.
pub fn from_csv(body: &str) -> Result<f64> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut sum = 0.0;
    let mut count = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read csv row {}", index + 1))?;
        let row = parse_row(&record).with_context(|| format!("Invalid csv row {}", index + 1))?;

        sum += row.midpoint();
        count += 1;
    }

    if count == 0 {
        bail!("no price rows in the response");
    }

    Ok(sum / count as f64)
}

fn parse_row(record: &StringRecord) -> Result<PriceRow> {
    let high = parse_column(record, HIGH_COLUMN, "high")?;
    let low = parse_column(record, LOW_COLUMN, "low")?;

    Ok(PriceRow::new(high, low))
}

fn parse_column(record: &StringRecord, column: usize, name: &str) -> Result<f64> {
    let field = record
        .get(column)
        .ok_or_else(|| anyhow!("missing {} column", name))?;

    field
        .trim()
        .parse::<f64>()
        .map_err(|why| anyhow!("{} '{}' is not a number: {}", name, field, why))
}
