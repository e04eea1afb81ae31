use crate::domain::ports::OracleTransport;
use crate::error::OracleError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Failure(String),
}

/// An in-memory oracle transport that answers from a queue of canned replies.
///
/// Clones share the same queue and call log, so a test can hand one clone to
/// the engine and inspect the other. Running out of replies is reported as a
/// transport failure.
#[derive(Default, Clone)]
pub struct ScriptedOracle {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOracle {
    /// Creates a transport with no replies queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that returns `replies` in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = replies.into_iter().map(|r| Reply::Text(r.into())).collect();
        Self {
            replies: Arc::new(Mutex::new(queue)),
            prompts: Arc::default(),
        }
    }

    pub async fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().await.push_back(Reply::Text(reply.into()));
    }

    /// Queues a network failure for the next call.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(Reply::Failure(message.into()));
    }

    /// Every prompt received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl OracleTransport for ScriptedOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().await.push(prompt.to_string());
        match self.replies.lock().await.pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Failure(message)) => Err(OracleError::Network(message)),
            None => Err(OracleError::InvalidEnvelope(
                "scripted oracle has no reply left".to_string(),
            )),
        }
    }
}
