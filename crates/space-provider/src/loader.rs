use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::ProviderError;

/// Reads the rows of a collection file.
pub trait CollectionLoader: Send + Sync {
  /// Load every row of `path` as a JSON object.
  fn load_rows(&self, path: &Path) -> Result<Vec<Map<String, Value>>, ProviderError>;
}

/// Loads CSV files with a header row.
///
/// Cells are typed loosely: empty cells become `null`, integers and floats
/// become numbers, `true`/`false` become booleans, and everything else stays a
/// string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCollectionLoader;

impl CsvCollectionLoader {
  pub fn new() -> Self {
    Self
  }
}

fn cell(raw: &str) -> Value {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Value::Null;
  }
  if let Ok(i) = trimmed.parse::<i64>() {
    return Value::Number(i.into());
  }
  if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
    return Value::Number(n);
  }
  match trimmed {
    "true" | "True" => Value::Bool(true),
    "false" | "False" => Value::Bool(false),
    _ => Value::String(raw.to_string()),
  }
}

impl CollectionLoader for CsvCollectionLoader {
  fn load_rows(&self, path: &Path) -> Result<Vec<Map<String, Value>>, ProviderError> {
    let csv_error = |source| ProviderError::Csv {
      path: path.to_path_buf(),
      source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
      let record = record.map_err(csv_error)?;
      let row = headers
        .iter()
        .zip(record.iter())
        .map(|(header, value)| (header.to_string(), cell(value)))
        .collect();
      rows.push(row);
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded collection rows");
    Ok(rows)
  }
}
