//! Mock 图像分类器（用于测试，无需模型）

use async_trait::async_trait;

use crate::core::OracleError;
use crate::vision::{ClassDistribution, ImageClassifier, NormalizedImage};

/// Mock 分类器：返回固定分布，或固定失败
#[derive(Debug, Clone)]
pub struct MockImageClassifier {
    outcome: Result<ClassDistribution, OracleError>,
}

impl MockImageClassifier {
    pub fn returning(distribution: ClassDistribution) -> Self {
        Self {
            outcome: Ok(distribution),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(OracleError::Inference(message.into())),
        }
    }
}

#[async_trait]
impl ImageClassifier for MockImageClassifier {
    async fn classify(&self, _image: &NormalizedImage) -> Result<ClassDistribution, OracleError> {
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
