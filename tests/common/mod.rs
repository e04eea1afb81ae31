#![allow(dead_code)]

use ledger_recon::domain::row::Row;
use serde_json::json;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn row(date: &str, amount: &str, description: &str) -> Row {
    Row::new()
        .with("Date", date)
        .with("Amount", amount)
        .with("Currency", "USD")
        .with("Description", description)
}

/// One verdict object as the oracle would emit it.
pub fn verdict(index: usize, matched: bool, confidence: f64, reason: &str) -> serde_json::Value {
    json!({
        "file_b_index": index,
        "match": matched,
        "confidence": confidence,
        "reason": reason,
    })
}

/// A full oracle reply holding the given verdicts.
pub fn reply(verdicts: &[serde_json::Value]) -> String {
    serde_json::Value::Array(verdicts.to_vec()).to_string()
}

pub fn write_ledger(path: &Path, rows: &[(&str, &str, &str)]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["Date", "Amount", "Currency", "Description"])?;
    for (date, amount, description) in rows {
        wtr.write_record([*date, *amount, "USD", *description])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `rows` distinct daily entries starting on 2024-01-01.
pub fn generate_ledger(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["Date", "Amount", "Currency", "Description"])?;

    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    for i in 0..rows {
        let date = start + chrono::Days::new(i as u64);
        wtr.write_record([
            date.format("%m/%d/%Y").to_string(),
            format!("{}.00", 100 + i),
            "USD".to_string(),
            format!("Invoice {i}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
