//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；DeepSeek、OpenAI、自建推理服务均可。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::{GenerationOptions, LlmClient, Message, Role};

/// 输出长度上限使用的请求字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimitField {
    /// OpenAI 当前字段
    MaxCompletionTokens,
    /// DeepSeek 等兼容端点只认旧字段 max_tokens
    MaxTokens,
}

/// OpenAI 兼容客户端：持有 Client、model 名与生成参数，complete 时取首条 choice 的 content
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    options: GenerationOptions,
    token_limit: TokenLimitField,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str, options: GenerationOptions) -> Self {
        let config = match base_url {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            options,
            token_limit: TokenLimitField::MaxCompletionTokens,
        }
    }

    pub fn with_token_limit_field(mut self, field: TokenLimitField) -> Self {
        self.token_limit = field;
        self
    }

    pub fn token_limit_field(&self) -> TokenLimitField {
        self.token_limit
    }

    fn build_request(&self, messages: &[Message]) -> Result<CreateChatCompletionRequest, String> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(Self::to_openai_messages(messages)?)
            .temperature(self.options.temperature);
        match self.token_limit {
            TokenLimitField::MaxCompletionTokens => {
                args.max_completion_tokens(self.options.max_tokens);
            }
            TokenLimitField::MaxTokens => {
                #[allow(deprecated)]
                args.max_tokens(self.options.max_tokens);
            }
        }
        args.build().map_err(|e| e.to_string())
    }

    fn to_openai_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>, String> {
        messages
            .iter()
            .map(|m| {
                let content = m.content.clone();
                let msg = match m.role {
                    Role::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(content)
                        .build()
                        .map(ChatCompletionRequestMessage::System),
                    Role::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(content)
                        .build()
                        .map(ChatCompletionRequestMessage::User),
                    Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                        .content(content)
                        .build()
                        .map(ChatCompletionRequestMessage::Assistant),
                };
                msg.map_err(|e| e.to_string())
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let request = self.build_request(messages)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM usage"
            );
        }

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
