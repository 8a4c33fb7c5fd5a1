//! In-memory long and wide tables with CSV I/O.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::artifact::write_atomic;
use crate::error::Result;

/// A long-format result table: header row plus string records.
///
/// Short records are padded with empty cells so every row has one cell per
/// header.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LongTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Parse a CSV document with a header row.
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self::new(headers, rows))
    }

    pub fn read_csv(path: &Path) -> std::result::Result<Self, crate::error::SkipReason> {
        let file = std::fs::File::open(path)?;
        Ok(Self::from_reader(file)?)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Required columns absent from the header, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }
}

/// A wide table with an explicit, ordered column list.
///
/// `None` cells are missing values and serialize as empty CSV fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl WideTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`; `None` when missing or out of bounds.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Stack tables row-wise over the union of their columns.
    ///
    /// Columns keep first-seen order; cells a table lacks become missing.
    pub fn concat(tables: impl IntoIterator<Item = WideTable>) -> WideTable {
        let tables: Vec<WideTable> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();
        for table in &tables {
            for col in &table.columns {
                if !position.contains_key(col) {
                    position.insert(col.clone(), columns.len());
                    columns.push(col.clone());
                }
            }
        }

        let mut combined = WideTable::new(columns);
        for table in tables {
            let targets: Vec<usize> = table.columns.iter().map(|c| position[c]).collect();
            for row in table.rows {
                let mut out = vec![None; combined.columns.len()];
                for (cell, &target) in row.into_iter().zip(&targets) {
                    out[target] = cell;
                }
                combined.rows.push(out);
            }
        }
        combined
    }

    /// Render as CSV with a header row.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }

    /// Write as CSV to `path`, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_csv_bytes()?)
    }
}
