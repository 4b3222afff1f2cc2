use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::ImportError;

/// A bank export as read from disk: one header row plus string cells.
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding short rows with empty cells and dropping
    /// cells beyond the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(col).map(String::as_str).unwrap_or(""))
    }

    pub fn with_trimmed_headers(mut self) -> Self {
        for h in &mut self.headers {
            *h = h.trim().to_string();
        }
        self
    }

    /// Overwrite the named column, or append it when absent.
    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Self {
        let mut values = values.into_iter();
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = values.next().unwrap_or_default();
                }
            }
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(values.next().unwrap_or_default());
                }
            }
        }
        self
    }
}

/// Decode raw input bytes: UTF-8 first, Latin-1 when that fails.
pub fn decode_input(data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(e) => {
            warn!("Input is not valid UTF-8 ({e}); decoding as Latin-1");
            data.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Parse a delimited bank export into a [`Table`].
pub fn read_table(data: &[u8]) -> Result<Table, ImportError> {
    let content = decode_input(data);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(ImportError::UnreadableInput("no header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!("Read {} rows with columns {:?}", rows.len(), headers);
    Ok(Table::new(headers, rows))
}
