use crate::application::aggregate::aggregate;
use crate::application::resolver::AssignmentResolver;
use crate::config::MatchConfig;
use crate::domain::normalize::normalize;
use crate::domain::outcome::ReconciliationResult;
use crate::domain::ports::OracleTransportBox;
use crate::domain::row::{NormalizedRow, Row};
use crate::error::{ReconError, Result};
use tracing::info;

/// The main entry point for reconciling two ledgers.
///
/// `ReconciliationEngine` owns the oracle transport and the matching
/// configuration. Each call to [`reconcile`](Self::reconcile) is independent:
/// all intermediate state lives on that call's stack, so one engine can serve
/// concurrent requests.
pub struct ReconciliationEngine {
    transport: OracleTransportBox,
    config: MatchConfig,
}

impl ReconciliationEngine {
    /// Creates a new `ReconciliationEngine`.
    ///
    /// # Arguments
    ///
    /// * `transport` - The connection to the semantic-matching oracle.
    /// * `config` - Tolerances, threshold and input size cap.
    pub fn new(transport: OracleTransportBox, config: MatchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Pairs rows of `left` with rows of `right`.
    ///
    /// Rejects oversized input before contacting the oracle. Left rows are
    /// processed strictly in index order with one oracle call per left row
    /// that has candidates. A transport failure aborts the whole run.
    pub async fn reconcile(&self, left: &[Row], right: &[Row]) -> Result<ReconciliationResult> {
        let total = left.len() + right.len();
        if total > self.config.max_total_rows {
            return Err(ReconError::RowLimitExceeded {
                total,
                max: self.config.max_total_rows,
            });
        }

        let left: Vec<NormalizedRow> = left.iter().map(normalize).collect();
        let right: Vec<NormalizedRow> = right.iter().map(normalize).collect();
        info!(
            left_rows = left.len(),
            right_rows = right.len(),
            "starting reconciliation"
        );

        let resolver = AssignmentResolver::new(self.transport.as_ref(), &self.config);
        let state = resolver.resolve(&left, &right).await?;
        let result = aggregate(&left, &right, state);

        info!(
            matched = result.summary.matched,
            unmatched_left = result.summary.unmatched_left,
            unmatched_right = result.summary.unmatched_right,
            oracle_calls = result.summary.oracle_calls,
            parse_failures = result.summary.parse_failures,
            "reconciliation finished"
        );
        Ok(result)
    }
}
