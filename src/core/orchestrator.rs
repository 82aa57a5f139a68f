//! 预测编排器：单次请求的完整流程
//!
//! 解码 → 分类 → 校准 → 建议。只有解码阶段（输入校验）会终止请求；
//! 分类走 模型 → 启发式 → 随机 三级降级，建议走 文本模型 → 知识库 降级。
//! 两个外部模型都是懒加载单例，由 LazyOracle 保证只初始化一次。
//! 启发式在阻塞线程池上运行；它本身不会失败，线程崩溃属于编程错误（500）。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::RgbImage;
use serde_json::Value;

use crate::advice::{RecommendationResult, Recommender, TreatmentKnowledgeBase};
use crate::calibration::{calibrate_distribution, ClassificationResult};
use crate::config::{AppConfig, ClassifierSection, LlmSection};
use crate::core::oracle::{deadline_from_secs, run_guarded};
use crate::core::{
    KnowledgeBaseError, LazyOracle, OracleError, PhaseTracker, PredictError, RequestPhase,
};
use crate::llm::{create_deepseek_client, LlmClient, OpenAiClient};
use crate::vision::{
    decode_base64_image, HeuristicClassifier, ImageClassifier, NormalizedImage, PixelStats,
    RandomSource, RemoteImageClassifier, StdRandom,
};

/// 单次预测请求：解码后的图像 + 症状描述
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub image: Arc<RgbImage>,
    pub symptoms: String,
}

impl PredictionRequest {
    /// 从 JSON 请求体解析：`image` 必填（base64），`text` 可选
    pub fn from_json(payload: &Value) -> Result<Self, PredictError> {
        let fields = payload.as_object().ok_or(PredictError::MissingImage)?;
        let encoded = match fields.get("image") {
            None | Some(Value::Null) => return Err(PredictError::MissingImage),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(PredictError::ImageDecode(format!(
                    "image must be a base64 string, got {}",
                    json_type(other)
                )))
            }
        };
        let image = decode_base64_image(encoded)?;
        let symptoms = fields
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            image: Arc::new(image),
            symptoms,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 一次成功预测的结果；序列化后由接口层推进到 Responded
#[derive(Debug, Clone)]
pub struct Prediction {
    pub classification: ClassificationResult,
    pub recommendation: RecommendationResult,
    phase: PhaseTracker,
}

impl Prediction {
    pub fn phase(&self) -> RequestPhase {
        self.phase.current()
    }

    /// 响应已构建：Recommended → Responded
    pub fn mark_responded(&mut self) -> Result<(), PredictError> {
        self.phase.advance(RequestPhase::Responded)
    }

    pub fn predicted_class(&self) -> &'static str {
        self.classification.label.name()
    }

    /// 百分比，两位小数
    pub fn confidence(&self) -> String {
        self.classification.display_confidence()
    }
}

/// 模型可用性（启动预热时汇报）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleStatus {
    pub image_model: bool,
    pub text_model: bool,
}

pub struct Predictor {
    classifier: LazyOracle<dyn ImageClassifier>,
    classifier_timeout: Option<Duration>,
    heuristic: HeuristicClassifier,
    random: Arc<Mutex<Box<dyn RandomSource>>>,
    recommender: Recommender,
}

impl Predictor {
    pub fn new(classifier: LazyOracle<dyn ImageClassifier>, recommender: Recommender) -> Self {
        Self {
            classifier,
            classifier_timeout: None,
            heuristic: HeuristicClassifier::new(),
            random: Arc::new(Mutex::new(Box::new(StdRandom::from_entropy()))),
            recommender,
        }
    }

    /// 替换随机源（测试注入固定种子）
    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Arc::new(Mutex::new(random));
        self
    }

    pub fn with_classifier_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.classifier_timeout = timeout;
        self
    }

    /// 按配置组装：远程分类器、LLM 后端、知识库（覆盖文件加载失败视为配置错误）
    pub fn from_config(cfg: &AppConfig) -> Result<Self, KnowledgeBaseError> {
        let knowledge = match &cfg.knowledge_base.path {
            Some(path) => {
                let kb = TreatmentKnowledgeBase::load(path)?;
                tracing::info!("Loaded treatment knowledge base from {}", path.display());
                kb
            }
            None => TreatmentKnowledgeBase::builtin(),
        };

        let classifier_cfg = cfg.classifier.clone();
        let classifier: LazyOracle<dyn ImageClassifier> =
            LazyOracle::new("image classification model", move || {
                create_classifier_from_config(&classifier_cfg)
            });

        let llm_cfg = cfg.llm.clone();
        let llm: LazyOracle<dyn LlmClient> =
            LazyOracle::new("text generation model", move || create_llm_from_config(&llm_cfg));

        let recommender = Recommender::new(llm, Arc::new(knowledge))
            .with_timeout(deadline_from_secs(cfg.llm.timeouts.request));

        Ok(Self::new(classifier, recommender)
            .with_classifier_timeout(deadline_from_secs(cfg.classifier.timeout_secs)))
    }

    /// 启动前预热两个模型，避免首批请求承担加载延迟
    pub async fn warm_up(&self) -> OracleStatus {
        let image_model = self.classifier.get().await.is_ok();
        let text_model = self.recommender.warm_up().await;
        OracleStatus {
            image_model,
            text_model,
        }
    }

    /// 完整流程：JSON 请求体 → 预测结果
    pub async fn predict_json(&self, payload: &Value) -> Result<Prediction, PredictError> {
        let mut phase = PhaseTracker::new();
        let request = PredictionRequest::from_json(payload)?;
        phase.advance(RequestPhase::Decoded)?;
        self.run(request, phase).await
    }

    /// 已解码请求的流程
    pub async fn predict(&self, request: PredictionRequest) -> Result<Prediction, PredictError> {
        let mut phase = PhaseTracker::new();
        phase.advance(RequestPhase::Decoded)?;
        self.run(request, phase).await
    }

    async fn run(
        &self,
        request: PredictionRequest,
        mut phase: PhaseTracker,
    ) -> Result<Prediction, PredictError> {
        let classified = self.classify(&request.image).await?;
        phase.advance(RequestPhase::Classified)?;

        let classification = classified.with_floor();
        phase.advance(RequestPhase::Calibrated)?;
        tracing::info!(
            "Final prediction: {} with {}% confidence",
            classification.label,
            classification.display_confidence()
        );

        let recommendation = self
            .recommender
            .recommend(classification.label, &request.symptoms)
            .await;
        phase.advance(RequestPhase::Recommended)?;

        Ok(Prediction {
            classification,
            recommendation,
            phase,
        })
    }

    /// 分类阶段：模型失败时降级到启发式
    pub async fn classify(&self, image: &Arc<RgbImage>) -> Result<ClassificationResult, PredictError> {
        match self.classify_with_model(image).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!("Image model unavailable ({}), using heuristic fallback", e);
                self.classify_with_heuristic(image).await
            }
        }
    }

    async fn classify_with_model(
        &self,
        image: &Arc<RgbImage>,
    ) -> Result<ClassificationResult, OracleError> {
        let model = self.classifier.get().await?;
        tracing::debug!(model = model.name(), "Using trained model for prediction");

        let image = Arc::clone(image);
        let distribution = run_guarded(
            async move {
                let input = NormalizedImage::from_rgb(&image);
                model.classify(&input).await
            },
            self.classifier_timeout,
        )
        .await?;

        calibrate_distribution(&distribution)
            .ok_or_else(|| OracleError::InvalidOutput("empty distribution".to_string()))
    }

    async fn classify_with_heuristic(
        &self,
        image: &Arc<RgbImage>,
    ) -> Result<ClassificationResult, PredictError> {
        let image = Arc::clone(image);
        let random = Arc::clone(&self.random);
        let heuristic = self.heuristic;

        tokio::task::spawn_blocking(move || {
            let stats = PixelStats::compute(&image);
            let mut guard = random.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            heuristic.classify(stats, guard.as_mut())
        })
        .await
        .map_err(|e| PredictError::ClassificationFailed(format!("heuristic fallback aborted: {e}")))
    }
}

/// 根据配置创建远程图像分类器；未配置 endpoint 时不可用
pub(crate) fn create_classifier_from_config(
    cfg: &ClassifierSection,
) -> Result<Arc<dyn ImageClassifier>, OracleError> {
    let endpoint = cfg
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| OracleError::Unavailable("no classifier endpoint configured".to_string()))?;
    tracing::info!("Using remote image classifier at {}", endpoint);
    Ok(Arc::new(RemoteImageClassifier::new(endpoint, cfg.timeout_secs)?))
}

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容）；没有 API Key 时不可用
pub(crate) fn create_llm_from_config(cfg: &LlmSection) -> Result<Arc<dyn LlmClient>, OracleError> {
    let provider = cfg.provider.to_lowercase();
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();
    let options = cfg.generation_options();

    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    let deepseek = deepseek_key.or_else(|| {
        if provider == "deepseek" {
            openai_key.clone()
        } else {
            None
        }
    });

    if let Some(key) = deepseek {
        let model = cfg.deepseek.model.clone().unwrap_or_else(|| cfg.model.clone());
        tracing::info!("Using DeepSeek LLM ({})", model);
        return Ok(Arc::new(create_deepseek_client(&key, Some(&model), options)));
    }

    match openai_key {
        Some(key) if provider != "deepseek" => {
            let model = cfg
                .openai
                .model
                .clone()
                .unwrap_or_else(|| "gpt-4o-mini".to_string());
            tracing::info!("Using OpenAI LLM ({})", model);
            Ok(Arc::new(OpenAiClient::new(
                cfg.base_url.as_deref(),
                &model,
                &key,
                options,
            )))
        }
        _ => Err(OracleError::Unavailable(
            "no DEEPSEEK_API_KEY or OPENAI_API_KEY set".to_string(),
        )),
    }
}
