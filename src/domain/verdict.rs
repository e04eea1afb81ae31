use serde::Serialize;

/// Reason recorded for every candidate of a batch whose response was unreadable.
pub const PARSE_FAILURE_REASON: &str = "parse failure";

/// Reason recorded when the oracle omits one.
pub const MISSING_REASON: &str = "no reason given";

/// One oracle judgment for one candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleVerdict {
    pub right_index: usize,
    pub matched: bool,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub reason: String,
}

impl OracleVerdict {
    pub fn new(right_index: usize, matched: bool, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            right_index,
            matched,
            confidence: clamp_confidence(confidence),
            reason: reason.into(),
        }
    }

    /// Zero-confidence, unmatched verdict standing in for an unreadable response.
    pub fn parse_failure(right_index: usize) -> Self {
        Self::new(right_index, false, 0.0, PARSE_FAILURE_REASON)
    }
}

/// What a single oracle call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Judgement {
    /// The response was readable; possibly empty.
    Verdicts(Vec<OracleVerdict>),
    /// The response could not be read as a verdict array. `raw` is kept for diagnostics.
    ParseFailure { raw: String },
}

impl Judgement {
    pub fn empty() -> Self {
        Self::Verdicts(Vec::new())
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure { .. })
    }
}

/// Where an audited verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Oracle,
    ParseFailure,
}

pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}
