//! DeepSeek API 客户端（OpenAI 兼容格式）
//!
//! - Base URL: https://api.deepseek.com
//! - 模型: deepseek-chat（护理建议生成只需常规对话模型）

use crate::llm::openai::TokenLimitField;
use crate::llm::{GenerationOptions, OpenAiClient};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 创建 DeepSeek 客户端；模型优先取参数，其次 `DEEPSEEK_MODEL` 环境变量
pub fn create_deepseek_client(api_key: &str, model: Option<&str>, options: GenerationOptions) -> OpenAiClient {
    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    // DeepSeek 只识别 max_tokens
    OpenAiClient::new(Some(DEEPSEEK_BASE_URL), &model, api_key, options)
        .with_token_limit_field(TokenLimitField::MaxTokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_model_wins() {
        let client = create_deepseek_client("sk-test", Some("deepseek-reasoner"), GenerationOptions::default());
        assert_eq!(client.token_limit_field(), TokenLimitField::MaxTokens);
        assert_eq!(crate::llm::LlmClient::model(&client), "deepseek-reasoner");
    }
}
