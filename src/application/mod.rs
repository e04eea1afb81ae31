//! Application layer containing the reconciliation orchestration.
//!
//! This module defines the `ReconciliationEngine`, the primary entry point for
//! pairing two ledgers. It drives the oracle adapter and the greedy resolver
//! sequentially over left rows and assembles the audited result.

pub mod aggregate;
pub mod engine;
pub mod oracle;
pub mod resolver;
