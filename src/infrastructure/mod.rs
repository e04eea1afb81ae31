//! Adapters implementing the domain ports.

pub mod http_oracle;
pub mod scripted;
