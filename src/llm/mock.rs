//! Scripted LLM 客户端（用于测试，无需 API）

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::llm::{LlmClient, Message};

/// 固定回复或固定失败，并记录被调用次数
#[derive(Debug)]
pub struct ScriptedLlmClient {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedLlmClient {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            reply: Err(error.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
