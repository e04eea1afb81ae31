use crate::domain::row::Row;
use crate::error::Result;
use serde_json::Value;
use std::io::Read;

/// Reads ledger rows from a CSV source with a header line.
///
/// Every record becomes a [`Row`] keyed by the header names, with cell text
/// kept as strings. Cells and headers are trimmed, and short or long records
/// are accepted: missing trailing cells are left out, extra cells are dropped.
pub struct LedgerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LedgerReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads rows in file order.
    pub fn rows(mut self) -> Result<impl Iterator<Item = Result<Row>>> {
        let headers = self.reader.headers()?.clone();
        Ok(self.reader.into_records().map(move |record| -> Result<Row> {
            let record = record?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column, Value::String(cell.to_string())))
                .collect())
        }))
    }

    /// Reads the whole ledger, stopping at the first malformed record.
    pub fn read_all(self) -> Result<Vec<Row>> {
        self.rows()?.collect()
    }
}
