//! 文本生成模型抽象
//!
//! 后端（OpenAI 兼容 / DeepSeek / Scripted）实现 LlmClient：给定消息返回完整回复文本。

use async_trait::async_trait;

use crate::llm::Message;

/// 文本生成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.7,
        }
    }
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 返回模型原始输出；空字符串也算成功，由调用方判定是否可用
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 模型名（日志用）
    fn model(&self) -> &str;
}
