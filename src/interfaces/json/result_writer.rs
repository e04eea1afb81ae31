use crate::domain::outcome::ReconciliationResult;
use crate::error::Result;
use std::io::Write;

/// Writes a reconciliation result as a single JSON document.
pub struct ResultWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    /// Serializes `result` followed by a newline and flushes the sink.
    pub fn write_result(&mut self, result: &ReconciliationResult) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, result).map_err(std::io::Error::from)?;
        } else {
            serde_json::to_writer(&mut self.writer, result).map_err(std::io::Error::from)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
