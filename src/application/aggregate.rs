use crate::application::resolver::ResolverState;
use crate::domain::outcome::{ReconciliationResult, ReconciliationSummary, UnmatchedRow};
use crate::domain::row::NormalizedRow;
use std::collections::HashSet;

/// Assembles the final result from the resolver's accumulated state.
///
/// Unmatched rows are the complement of the committed indices on each side,
/// kept in original index order.
pub fn aggregate(
    left: &[NormalizedRow],
    right: &[NormalizedRow],
    state: ResolverState,
) -> ReconciliationResult {
    let matched_left: HashSet<usize> = state.assignments.iter().map(|a| a.left_index).collect();
    let matched_right: HashSet<usize> = state.assignments.iter().map(|a| a.right_index).collect();

    let unmatched_left = unmatched(left, &matched_left);
    let unmatched_right = unmatched(right, &matched_right);

    let summary = ReconciliationSummary {
        left_rows: left.len(),
        right_rows: right.len(),
        matched: state.assignments.len(),
        unmatched_left: unmatched_left.len(),
        unmatched_right: unmatched_right.len(),
        oracle_calls: state.oracle_calls,
        parse_failures: state.parse_failures,
    };

    ReconciliationResult {
        assignments: state.assignments,
        unmatched_left,
        unmatched_right,
        all_candidates: state.audit,
        summary,
    }
}

fn unmatched(rows: &[NormalizedRow], matched: &HashSet<usize>) -> Vec<UnmatchedRow> {
    rows.iter()
        .enumerate()
        .filter(|(index, _)| !matched.contains(index))
        .map(|(index, row)| UnmatchedRow {
            index,
            row: row.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalize::normalize;
    use crate::domain::outcome::Assignment;
    use crate::domain::row::Row;

    fn rows(n: usize) -> Vec<NormalizedRow> {
        (0..n)
            .map(|i| normalize(&Row::new().with("Ref", i.to_string())))
            .collect()
    }

    #[test]
    fn test_unmatched_are_complements() {
        let left = rows(3);
        let right = rows(4);
        let state = ResolverState {
            assignments: vec![
                Assignment {
                    left_index: 1,
                    right_index: 3,
                    confidence: 0.9,
                    reason: "x".into(),
                },
                Assignment {
                    left_index: 2,
                    right_index: 0,
                    confidence: 0.95,
                    reason: "y".into(),
                },
            ],
            oracle_calls: 3,
            ..Default::default()
        };

        let result = aggregate(&left, &right, state);

        let left_indices: Vec<usize> = result.unmatched_left.iter().map(|u| u.index).collect();
        let right_indices: Vec<usize> = result.unmatched_right.iter().map(|u| u.index).collect();
        assert_eq!(left_indices, vec![0]);
        assert_eq!(right_indices, vec![1, 2]);
        assert_eq!(result.unmatched_right[0].row, right[1]);
        assert_eq!(
            result.summary,
            ReconciliationSummary {
                left_rows: 3,
                right_rows: 4,
                matched: 2,
                unmatched_left: 1,
                unmatched_right: 2,
                oracle_calls: 3,
                parse_failures: 0,
            }
        );
    }

    #[test]
    fn test_empty_inputs() {
        let result = aggregate(&[], &[], ResolverState::default());
        assert!(result.assignments.is_empty());
        assert!(result.unmatched_left.is_empty());
        assert!(result.unmatched_right.is_empty());
        assert!(result.all_candidates.is_empty());
    }
}
