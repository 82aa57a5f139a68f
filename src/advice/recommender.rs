//! 护理建议生成：文本生成模型优先，失败时降级到知识库
//!
//! 模型首次需要时才初始化；不可用、报错、超时或后处理后为空，都返回知识库组合回复。
//! 本阶段不会向上返回错误。

use std::sync::Arc;
use std::time::Duration;

use crate::advice::{postprocess, treatment_messages, TreatmentKnowledgeBase};
use crate::core::oracle::run_guarded;
use crate::core::{LazyOracle, OracleError};
use crate::llm::LlmClient;
use crate::vision::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Generated,
    Fallback,
}

/// 护理建议；text 总是包含 dermatologist 免责提示
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub text: String,
    pub source: RecommendationSource,
}

pub struct Recommender {
    llm: LazyOracle<dyn LlmClient>,
    knowledge: Arc<TreatmentKnowledgeBase>,
    timeout: Option<Duration>,
}

impl Recommender {
    pub fn new(llm: LazyOracle<dyn LlmClient>, knowledge: Arc<TreatmentKnowledgeBase>) -> Self {
        Self {
            llm,
            knowledge,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn knowledge_base(&self) -> &TreatmentKnowledgeBase {
        &self.knowledge
    }

    /// 预先初始化文本模型；返回是否可用
    pub async fn warm_up(&self) -> bool {
        self.llm.get().await.is_ok()
    }

    pub async fn recommend(&self, label: Label, symptoms: &str) -> RecommendationResult {
        match self.generate(label, symptoms).await {
            Ok(text) => RecommendationResult {
                text,
                source: RecommendationSource::Generated,
            },
            Err(e) => {
                tracing::warn!("Text generation unavailable ({}), using knowledge base fallback", e);
                self.fallback(label)
            }
        }
    }

    pub fn fallback(&self, label: Label) -> RecommendationResult {
        RecommendationResult {
            text: self.knowledge.compose_fallback(label),
            source: RecommendationSource::Fallback,
        }
    }

    async fn generate(&self, label: Label, symptoms: &str) -> Result<String, OracleError> {
        let llm = self.llm.get().await?;
        let messages = treatment_messages(label, symptoms);
        tracing::debug!(model = llm.model(), "Generating treatment plan for {}", label);

        let raw = run_guarded(
            async move { llm.complete(&messages).await.map_err(OracleError::Inference) },
            self.timeout,
        )
        .await?;

        postprocess::finalize(&raw)
            .ok_or_else(|| OracleError::InvalidOutput("empty generation".to_string()))
    }
}
