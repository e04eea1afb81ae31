use crate::error::OracleError;
use async_trait::async_trait;

/// Transport to the external semantic-matching service.
///
/// Takes a fully rendered prompt and returns the raw response text.
/// Implementations report network, auth and quota problems as
/// [`OracleError`]; they do not retry.
#[async_trait]
pub trait OracleTransport: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

pub type OracleTransportBox = Box<dyn OracleTransport>;
