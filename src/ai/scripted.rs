use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use super::{AiError, CompletionRequest, ReasoningEngine};

/// Test engine that replays queued replies and records every request.
#[derive(Default)]
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(body)) => Err(AiError::Status { status: 503, body }),
            None => Err(AiError::EmptyResponse),
        }
    }
}
