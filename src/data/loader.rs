use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::data::dataset::{Dataset, YearRecord};
use crate::foundation::error::{SolarError, SolarResult};

/// How multiple rows for the same year are folded into one record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Aggregate {
    /// Yearly total (daily series summed per year).
    #[default]
    Sum,
    /// Yearly mean.
    Mean,
}

/// Options for [`load_csv_path`] / [`load_csv_reader`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOpts {
    /// Per-year aggregation of repeated years.
    pub aggregate: Aggregate,
    /// Skip unparseable rows (logged) instead of failing the load.
    pub skip_malformed: bool,
}

const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Load a dataset from a CSV file on disk.
#[tracing::instrument(skip(path, opts), fields(dataset = %path.as_ref().display()))]
pub fn load_csv_path(path: impl AsRef<Path>, opts: LoadOpts) -> SolarResult<Dataset> {
    let path = path.as_ref();
    let f = File::open(path)
        .map_err(|e| SolarError::data(format!("open dataset '{}': {e}", path.display())))?;
    load_csv_reader(BufReader::new(f), opts)
}

/// Load a dataset from CSV text.
///
/// Accepts either bare `year,value` rows or a headered table whose year/value columns are
/// found by name (`year`/`年`, `value`/`數值`). Repeated years are aggregated per
/// [`LoadOpts::aggregate`] and the result is sorted by year.
pub fn load_csv_reader<R: Read>(mut r: R, opts: LoadOpts) -> SolarResult<Dataset> {
    let mut text = String::new();
    r.read_to_string(&mut text)
        .map_err(|e| SolarError::data(format!("read dataset: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .delimiter(sniff_delimiter(&text))
        .from_reader(text.as_bytes());

    let mut rows = reader.records();
    let Some(first) = rows.next() else {
        return Err(SolarError::data("dataset is empty"));
    };
    let first = first.map_err(|e| SolarError::data(format!("parse dataset header: {e}")))?;

    let header = header_columns(&first);
    let columns = header.unwrap_or(Columns { year: 0, value: 1 });
    // Headerless input: the first row is data and is checked like any other.
    let leading = header.is_none().then_some(first);

    let mut yearly: BTreeMap<i32, (f64, u32)> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in leading.into_iter().map(Ok).chain(rows) {
        let row = row.map_err(|e| SolarError::data(format!("parse dataset: {e}")))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        match parse_row(&row, columns) {
            Ok((year, value)) => {
                let slot = yearly.entry(year).or_insert((0.0, 0));
                slot.0 += value;
                slot.1 += 1;
            }
            Err(reason) if opts.skip_malformed => {
                tracing::debug!(line, %reason, "skipping malformed dataset row");
                skipped += 1;
            }
            Err(reason) => {
                return Err(SolarError::data(format!("line {line}: {reason}")));
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped malformed dataset rows");
    }

    let records = yearly
        .into_iter()
        .map(|(year, (sum, n))| YearRecord {
            year,
            value: match opts.aggregate {
                Aggregate::Sum => sum,
                Aggregate::Mean => sum / f64::from(n),
            },
        })
        .collect::<Vec<_>>();
    tracing::debug!(years = records.len(), "aggregated dataset");
    Dataset::new(records)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Columns {
    year: usize,
    value: usize,
}

fn sniff_delimiter(text: &str) -> u8 {
    let line = text
        .lines()
        .find(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .unwrap_or("");
    DELIMITERS
        .iter()
        .copied()
        .max_by_key(|&d| line.bytes().filter(|&b| b == d).count())
        .filter(|&d| line.as_bytes().contains(&d))
        .unwrap_or(b',')
}

fn is_year_column(name: &str) -> bool {
    name.to_lowercase().contains("year") || name.contains('年')
}

fn is_value_column(name: &str) -> bool {
    name.to_lowercase().contains("value") || name.contains("數值") || name.contains("数值")
}

/// Column indices from a header row; `None` when the row is data.
///
/// A row whose first field is a year is data even if the rest of it is malformed.
fn header_columns(row: &csv::StringRecord) -> Option<Columns> {
    let year = row.iter().position(is_year_column);
    let value = row.iter().position(is_value_column);
    match (year, value) {
        (Some(year), Some(value)) if year != value => Some(Columns { year, value }),
        (None, None) if row.get(0).and_then(parse_year).is_some() => None,
        // Unrecognized header: fall back to the first two columns.
        _ => Some(Columns { year: 0, value: 1 }),
    }
}

fn parse_row(row: &csv::StringRecord, cols: Columns) -> Result<(i32, f64), String> {
    let year_s = row
        .get(cols.year)
        .ok_or_else(|| format!("missing year column {}", cols.year))?;
    let value_s = row
        .get(cols.value)
        .ok_or_else(|| format!("missing value column {}", cols.value))?;

    let year = parse_year(year_s).ok_or_else(|| format!("invalid year '{year_s}'"))?;
    let value = value_s
        .parse::<f64>()
        .map_err(|_| format!("invalid value '{value_s}'"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("value must be finite and >= 0, got '{value_s}'"));
    }
    Ok((year, value))
}

fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/loader.rs"]
mod tests;
