//! Recording fake backend shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::extractor::RawResponse;
use super::strategy::{GenerativeBackend, Strategy};
use super::{BackendCall, BackendError};

/// Scripted outcome of one `invoke`.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(&'static str),
    Body(Value),
    Rejected(&'static str),
    Failed(u16, &'static str),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub strategy: Strategy,
    pub model: String,
    pub prompt: String,
    pub has_image: bool,
    pub max_output_tokens: Option<u32>,
}

pub struct FakeBackend {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
    strategies: Vec<Strategy>,
}

impl FakeBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            strategies: Strategy::PRIORITY.to_vec(),
        }
    }

    pub fn with_strategies(mut self, strategies: &[Strategy]) -> Self {
        self.strategies = strategies.to_vec();
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model: &str) -> usize {
        self.calls().iter().filter(|c| c.model == model).count()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    fn supports(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }

    async fn invoke(
        &self,
        strategy: Strategy,
        call: &BackendCall<'_>,
    ) -> Result<RawResponse, BackendError> {
        self.calls.lock().unwrap().push(RecordedCall {
            strategy,
            model: call.model.to_string(),
            prompt: call.prompt.to_string(),
            has_image: call.image.is_some(),
            max_output_tokens: call.params.max_output_tokens,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Failed(500, "no scripted reply"));

        match reply {
            Reply::Text(text) => Ok(RawResponse::new(json!({ "text": text }))),
            Reply::Body(body) => Ok(RawResponse::new(body)),
            Reply::Rejected(reason) => Err(BackendError::Rejected(reason.to_string())),
            Reply::Failed(status, message) => Err(BackendError::Api {
                status,
                message: message.to_string(),
            }),
        }
    }
}
