//! In-memory lookup table and its CSV wire format.
//!
//! ```text
//! id,a,b,c\r\n
//! 6c1f...,1,2.0,True\r\n
//! ```
//!
//! The header starts with `id`, followed by the column names in ascending
//! order. Rows are CRLF-terminated and fields are quoted only when needed.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use uuid::Uuid;

use super::value::{Columns, Params, Value};
use super::LookupError;

/// Name of the identifier column.
pub const ID_COLUMN: &str = "id";

/// A data row: generated identifier plus one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub values: Vec<Value>,
}

/// Snapshot of a lookup table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Table {
    /// Creates a table without rows; columns are sorted.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        columns.sort();
        columns.dedup();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names without `id`.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Header row including `id`.
    #[must_use]
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(ID_COLUMN)
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id.as_str()).collect()
    }

    /// True if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Params of the row with identifier `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Params> {
        self.rows.iter().find(|row| row.id == id).map(|row| {
            self.columns
                .iter()
                .cloned()
                .zip(row.values.iter().cloned())
                .collect()
        })
    }

    /// Identifier of the row whose values equal `params`.
    ///
    /// `params` has to name every column. Empty text matches a null cell.
    #[must_use]
    pub fn find(&self, params: &Params) -> Option<&str> {
        if !self.keys_match(params) {
            return None;
        }
        self.rows
            .iter()
            .find(|row| {
                row.values
                    .iter()
                    .zip(params.values())
                    .all(|(cell, value)| *cell == value.stored())
            })
            .map(|row| row.id.as_str())
    }

    fn keys_match(&self, params: &Params) -> bool {
        params.keys().eq(self.columns.iter())
    }

    /// Adds a row for `params` and returns its new identifier.
    ///
    /// # Errors
    ///
    /// - [`LookupError::ColumnMismatch`] if the keys differ from the columns
    /// - [`LookupError::DuplicateEntry`] if a row has the same values
    pub fn append(&mut self, params: &Params) -> Result<String, LookupError> {
        if !self.keys_match(params) {
            return Err(LookupError::column_mismatch(
                &self.columns,
                params.keys().cloned().collect(),
            ));
        }
        if self.find(params).is_some() {
            return Err(LookupError::duplicate_entry(super::value::describe(params)));
        }
        let id = new_id();
        self.rows.push(Row {
            id: id.clone(),
            values: params.values().map(Value::stored).collect(),
        });
        Ok(id)
    }

    /// Removes the row with identifier `id`; returns false if there is none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    /// Drops all data rows.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Adds the columns not present yet.
    ///
    /// Existing rows are filled with the given value. A non-null value for
    /// a new column of a table without rows starts a first row that is null
    /// everywhere else. Columns are re-sorted afterwards.
    pub fn extend(&mut self, columns: &Columns) {
        for (name, value) in columns.iter() {
            if self.columns.iter().any(|column| column == name) {
                continue;
            }
            let value = value.stored();
            self.columns.push(name.to_string());
            if self.rows.is_empty() && !value.is_null() {
                let mut values = vec![Value::Null; self.columns.len() - 1];
                values.push(value);
                self.rows.push(Row {
                    id: new_id(),
                    values,
                });
            } else {
                for row in &mut self.rows {
                    row.values.push(value.clone());
                }
            }
        }
        self.sort_columns();
    }

    fn sort_columns(&mut self) {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        order.sort_by(|&left, &right| self.columns[left].cmp(&self.columns[right]));
        if order.iter().enumerate().all(|(position, &index)| position == index) {
            return;
        }
        self.columns = order.iter().map(|&index| self.columns[index].clone()).collect();
        for row in &mut self.rows {
            row.values = order.iter().map(|&index| row.values[index].clone()).collect();
        }
    }

    /// Reads a table from its CSV text; `url` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MalformedTable`] if the text is not CSV, the
    /// header does not start with `id`, or a row has the wrong length.
    pub fn parse(text: &str, url: &str) -> Result<Self, LookupError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record.map_err(|error| LookupError::malformed_table(url, error.to_string()))?,
            None => return Err(LookupError::malformed_table(url, "missing header row")),
        };
        let mut fields = header.iter();
        if fields.next() != Some(ID_COLUMN) {
            return Err(LookupError::malformed_table(
                url,
                format!("header has to start with '{ID_COLUMN}'"),
            ));
        }
        let columns: Vec<String> = fields.map(ToString::to_string).collect();

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(|error| LookupError::malformed_table(url, error.to_string()))?;
            if record.len() != columns.len() + 1 {
                return Err(LookupError::malformed_table(
                    url,
                    format!(
                        "row {} has {} fields, expected {}",
                        rows.len() + 1,
                        record.len(),
                        columns.len() + 1
                    ),
                ));
            }
            let mut fields = record.iter();
            let id = fields.next().unwrap_or_default().to_string();
            rows.push(Row {
                id,
                values: fields.map(Value::decode).collect(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Serializes the table to CSV bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MalformedTable`] if the CSV writer fails.
    pub fn to_csv(&self, url: &str) -> Result<Vec<u8>, LookupError> {
        let csv_error = |error: csv::Error| LookupError::malformed_table(url, error.to_string());
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());
        writer.write_record(self.header()).map_err(csv_error)?;
        for row in &self.rows {
            let record = std::iter::once(row.id.clone()).chain(row.values.iter().map(Value::encode));
            writer.write_record(record).map_err(csv_error)?;
        }
        writer
            .into_inner()
            .map_err(|error| LookupError::malformed_table(url, error.error().to_string()))
    }
}
