//! In-memory LLM backend for unit and handler tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{LlmBackend, LlmClient, LlmError, StructuredRequest};

enum Reply {
    Text(String),
    Fail(String),
}

/// Replays canned replies in order and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    temperatures: Mutex<Vec<f32>>,
}

impl ScriptedBackend {
    pub fn with_replies<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::default();
        {
            let mut queue = backend.replies.lock().unwrap();
            queue.extend(replies.into_iter().map(|r| Reply::Text(r.into())));
        }
        Arc::new(backend)
    }

    /// Queues a provider failure (surfaced as a 503 API error).
    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
    }

    pub fn push_reply(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Text(text.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.temperatures.lock().unwrap().clone()
    }

    pub fn client(self: &Arc<Self>) -> LlmClient {
        LlmClient::new(self.clone())
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        self.temperatures.lock().unwrap().push(request.temperature);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(LlmError::Api {
                status: 503,
                message,
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}
