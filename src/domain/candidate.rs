use crate::domain::normalize::{parse_amount, parse_calendar_date};
use crate::domain::row::NormalizedRow;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::warn;

/// Maximum divergence for two rows to be considered candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub date_days: u32,
    pub amount: Decimal,
}

/// A left row paired with one right row that falls inside the tolerance window.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub left_index: usize,
    pub right_index: usize,
    pub left: &'a NormalizedRow,
    pub right: &'a NormalizedRow,
}

/// Right rows within the date and amount window of `left`, skipping used indices.
///
/// Both sides need a parseable date and amount; a row missing either is
/// never a candidate.
pub fn candidates_for<'a>(
    left_index: usize,
    left: &'a NormalizedRow,
    right_rows: &'a [NormalizedRow],
    used_right: &HashSet<usize>,
    tolerance: &Tolerance,
) -> Vec<CandidatePair<'a>> {
    let Some(left_date) = left.date().as_deref().and_then(parse_calendar_date) else {
        warn!(left_index, "left row has no usable date");
        return Vec::new();
    };
    let Some(left_amount) = left.amount().as_deref().and_then(parse_amount) else {
        warn!(left_index, "left row has no usable amount");
        return Vec::new();
    };

    right_rows
        .iter()
        .enumerate()
        .filter(|(right_index, _)| !used_right.contains(right_index))
        .filter(|(_, right)| {
            right
                .date()
                .as_deref()
                .and_then(parse_calendar_date)
                .is_some_and(|date| {
                    (left_date - date).num_days().unsigned_abs() <= u64::from(tolerance.date_days)
                })
        })
        .filter(|(_, right)| {
            right
                .amount()
                .as_deref()
                .and_then(parse_amount)
                .is_some_and(|amount| (left_amount - amount).abs() <= tolerance.amount)
        })
        .map(|(right_index, right)| CandidatePair {
            left_index,
            right_index,
            left,
            right,
        })
        .collect()
}
