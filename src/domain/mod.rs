//! Domain layer: ledger rows, normalization, candidate generation and the
//! value types produced by a reconciliation. Nothing here performs I/O.

pub mod candidate;
pub mod normalize;
pub mod outcome;
pub mod ports;
pub mod row;
pub mod verdict;
