use super::row::NormalizedRow;
use super::verdict::VerdictSource;
use serde::Serialize;

/// A committed one-to-one pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub left_index: usize,
    pub right_index: usize,
    pub confidence: f64,
    pub reason: String,
}

/// Audit entry for one verdict, with the rows it was about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    pub left_index: usize,
    pub right_index: usize,
    pub left_row: NormalizedRow,
    pub right_row: NormalizedRow,
    /// What the oracle said, not whether it was committed.
    pub matched: bool,
    pub confidence: f64,
    pub reason: String,
    pub source: VerdictSource,
    /// True only for the verdict that became an [`Assignment`].
    pub assigned: bool,
}

/// A row that ended up in no assignment, with its original index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRow {
    pub index: usize,
    pub row: NormalizedRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    pub matched: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
    pub oracle_calls: usize,
    pub parse_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub assignments: Vec<Assignment>,
    pub unmatched_left: Vec<UnmatchedRow>,
    pub unmatched_right: Vec<UnmatchedRow>,
    pub all_candidates: Vec<CandidateRecord>,
    pub summary: ReconciliationSummary,
}
