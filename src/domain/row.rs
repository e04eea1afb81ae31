use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;

/// Amount-bearing columns, in lookup priority order.
pub const AMOUNT_COLUMNS: [&str; 3] = ["Amount", "Credit Amount", "Debit Amount"];

/// Currency-bearing columns, in lookup priority order.
pub const CURRENCY_COLUMNS: [&str; 4] = ["Currency", "Currency Code", "CCY", "Curr"];

/// One ledger record: an ordered mapping of column name to value.
///
/// The schema is not fixed; two ledgers fed into the same reconciliation
/// usually disagree on column names and value formats. Amount, currency
/// and date are derived on demand from well-known column names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, keeps column order.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First non-blank value among [`AMOUNT_COLUMNS`].
    pub fn amount(&self) -> Option<String> {
        self.first_non_blank(&AMOUNT_COLUMNS)
    }

    /// First non-blank value among [`CURRENCY_COLUMNS`].
    pub fn currency(&self) -> Option<String> {
        self.first_non_blank(&CURRENCY_COLUMNS)
    }

    /// The top-level date field, if present and non-blank.
    pub fn date(&self) -> Option<String> {
        self.0
            .iter()
            .find(|(name, _)| is_date_field(name))
            .and_then(|(_, value)| scalar_text(value))
            .filter(|text| !text.is_empty())
    }

    fn first_non_blank(&self, columns: &[&str]) -> Option<String> {
        columns.iter().find_map(|wanted| {
            self.0
                .iter()
                .filter(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
                .find_map(|(_, value)| scalar_text(value).filter(|text| !text.is_empty()))
        })
    }
}

impl From<Map<String, Value>> for Row {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        )
    }
}

/// A [`Row`] whose date fields have been canonicalized to `MM/DD/YYYY`.
///
/// Only [`crate::domain::normalize::normalize`] constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRow(Row);

impl NormalizedRow {
    pub(crate) fn new(row: Row) -> Self {
        Self(row)
    }

    pub fn into_row(self) -> Row {
        self.0
    }
}

impl Deref for NormalizedRow {
    type Target = Row;

    fn deref(&self) -> &Row {
        &self.0
    }
}

/// True for a column whose trimmed, case-insensitive name is `date`.
pub fn is_date_field(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("date")
}

/// Trimmed textual form of a scalar value. Nested values and nulls yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
