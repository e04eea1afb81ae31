use crate::application::oracle::MatchOracle;
use crate::config::MatchConfig;
use crate::domain::candidate::{Tolerance, candidates_for};
use crate::domain::outcome::{Assignment, CandidateRecord};
use crate::domain::ports::OracleTransport;
use crate::domain::row::NormalizedRow;
use crate::domain::verdict::{Judgement, OracleVerdict, VerdictSource};
use crate::error::Result;
use std::collections::HashSet;
use tracing::{debug, info};

/// Accumulator threaded through the left-to-right pass.
///
/// Owned by a single reconciliation; nothing is shared between runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResolverState {
    pub used_left: HashSet<usize>,
    pub used_right: HashSet<usize>,
    pub assignments: Vec<Assignment>,
    pub audit: Vec<CandidateRecord>,
    pub oracle_calls: usize,
    pub parse_failures: usize,
}

/// Greedy one-to-one assignment over left rows in index order.
///
/// Single pass, no backtracking: a committed pairing is final even if a later
/// left row would have scored higher against the same right row.
pub struct AssignmentResolver<'t> {
    oracle: MatchOracle<'t>,
    tolerance: Tolerance,
    threshold: f64,
}

impl<'t> AssignmentResolver<'t> {
    pub fn new(transport: &'t dyn OracleTransport, config: &MatchConfig) -> Self {
        Self {
            oracle: MatchOracle::new(transport),
            tolerance: config.tolerance(),
            threshold: config.match_threshold,
        }
    }

    pub async fn resolve(
        &self,
        left: &[NormalizedRow],
        right: &[NormalizedRow],
    ) -> Result<ResolverState> {
        let mut state = ResolverState::default();
        for left_index in 0..left.len() {
            state = self.step(state, left_index, left, right).await?;
        }
        Ok(state)
    }

    /// Processes one left row against the right rows still available in `state`.
    pub async fn step(
        &self,
        mut state: ResolverState,
        left_index: usize,
        left: &[NormalizedRow],
        right: &[NormalizedRow],
    ) -> Result<ResolverState> {
        if state.used_left.contains(&left_index) {
            return Ok(state);
        }
        let Some(left_row) = left.get(left_index) else {
            return Ok(state);
        };

        let candidates = candidates_for(
            left_index,
            left_row,
            right,
            &state.used_right,
            &self.tolerance,
        );
        if candidates.is_empty() {
            debug!(left_index, "no candidates in tolerance window");
            return Ok(state);
        }

        let judgement = self.oracle.judge(left_row, &candidates).await?;
        state.oracle_calls += 1;

        let (verdicts, source) = match judgement {
            Judgement::Verdicts(verdicts) => (verdicts, VerdictSource::Oracle),
            Judgement::ParseFailure { .. } => {
                state.parse_failures += 1;
                let verdicts = candidates
                    .iter()
                    .map(|candidate| OracleVerdict::parse_failure(candidate.right_index))
                    .collect();
                (verdicts, VerdictSource::ParseFailure)
            }
        };

        let chosen = select_best(&verdicts, self.threshold);

        for (position, verdict) in verdicts.iter().enumerate() {
            let Some(right_row) = right.get(verdict.right_index) else {
                continue;
            };
            state.audit.push(CandidateRecord {
                left_index,
                right_index: verdict.right_index,
                left_row: left_row.clone(),
                right_row: right_row.clone(),
                matched: verdict.matched,
                confidence: verdict.confidence,
                reason: verdict.reason.clone(),
                source,
                assigned: chosen == Some(position),
            });
        }

        if let Some(position) = chosen {
            let verdict = &verdicts[position];
            info!(
                left_index,
                right_index = verdict.right_index,
                confidence = verdict.confidence,
                "committed match"
            );
            state.used_left.insert(left_index);
            state.used_right.insert(verdict.right_index);
            state.assignments.push(Assignment {
                left_index,
                right_index: verdict.right_index,
                confidence: verdict.confidence,
                reason: verdict.reason.clone(),
            });
        }

        Ok(state)
    }
}

/// Position of the highest-confidence approved verdict, if it reaches `threshold`.
///
/// Ties go to the earliest verdict in response order.
pub fn select_best(verdicts: &[OracleVerdict], threshold: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (position, verdict) in verdicts.iter().enumerate() {
        if !verdict.matched {
            continue;
        }
        match best {
            Some(current) if verdicts[current].confidence >= verdict.confidence => {}
            _ => best = Some(position),
        }
    }
    best.filter(|&position| verdicts[position].confidence >= threshold)
}
