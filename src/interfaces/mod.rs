//! Adapters between external formats and the domain.

pub mod csv;
pub mod json;
