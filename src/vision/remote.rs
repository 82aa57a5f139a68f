//! 远程图像分类服务客户端
//!
//! POST {"shape": [1,3,224,224], "input": [...]} 到配置的 endpoint，
//! 响应为 {"probabilities": [...]} 或 {"logits": [...]}（后者先做 softmax）。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::OracleError;
use crate::vision::{ClassDistribution, ImageClassifier, NormalizedImage};

#[derive(Serialize)]
struct InferenceRequest<'a> {
    shape: [usize; 4],
    input: &'a [f32],
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    probabilities: Option<Vec<f32>>,
    logits: Option<Vec<f32>>,
}

impl InferenceResponse {
    fn into_distribution(self) -> Result<ClassDistribution, OracleError> {
        match (self.probabilities, self.logits) {
            (Some(p), _) => ClassDistribution::from_probabilities(p),
            (None, Some(l)) => ClassDistribution::from_logits(&l),
            (None, None) => Err(OracleError::InvalidOutput(
                "response has neither probabilities nor logits".to_string(),
            )),
        }
    }
}

/// 远程分类器：持有 HTTP Client 与 endpoint
pub struct RemoteImageClassifier {
    client: Client,
    endpoint: String,
}

impl RemoteImageClassifier {
    /// timeout_secs 为 0 时不设 HTTP 超时
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, OracleError> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(OracleError::Unavailable(format!(
                "classifier endpoint must be an http(s) URL: {endpoint}"
            )));
        }
        let mut builder = Client::builder().user_agent(concat!("skinoai/", env!("CARGO_PKG_VERSION")));
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ImageClassifier for RemoteImageClassifier {
    async fn classify(&self, image: &NormalizedImage) -> Result<ClassDistribution, OracleError> {
        let body = InferenceRequest {
            shape: image.shape,
            input: &image.data,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Inference(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Inference(format!("classifier returned HTTP {status}")));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidOutput(e.to_string()))?;
        parsed.into_distribution()
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}
