//! 图像分类模型抽象
//!
//! 所有后端（远程推理服务 / Mock）实现 ImageClassifier：输入归一化后的张量，输出每个标签的概率。

use async_trait::async_trait;

use crate::core::OracleError;
use crate::vision::{Label, NormalizedImage};

/// 图像分类模型 trait；推理可能阻塞很久，调用方自行加超时
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// 返回按 `Label::ALL` 顺序排列的概率分布
    async fn classify(&self, image: &NormalizedImage) -> Result<ClassDistribution, OracleError>;

    /// 后端名称（日志用）
    fn name(&self) -> &str;
}

/// 标签上的概率分布，构造时校验
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probabilities: Vec<f32>,
}

impl ClassDistribution {
    /// 每个标签一个有限、非负的概率
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self, OracleError> {
        if probabilities.len() != Label::COUNT {
            return Err(OracleError::InvalidOutput(format!(
                "expected {} classes, got {}",
                Label::COUNT,
                probabilities.len()
            )));
        }
        if let Some(bad) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(OracleError::InvalidOutput(format!("invalid probability {bad}")));
        }
        Ok(Self { probabilities })
    }

    /// 未归一化的 logits 先做 softmax
    pub fn from_logits(logits: &[f32]) -> Result<Self, OracleError> {
        Self::from_probabilities(softmax(logits))
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// 概率最高的 k 个 (标签, 概率)，降序
    pub fn top_k(&self, k: usize) -> Vec<(Label, f32)> {
        let mut ranked: Vec<(Label, f32)> = self
            .probabilities
            .iter()
            .enumerate()
            .filter_map(|(i, p)| Label::from_index(i).map(|l| (l, *p)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

/// 数值稳定的 softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(index: usize, p: f32) -> Vec<f32> {
        let rest = (1.0 - p) / (Label::COUNT as f32 - 1.0);
        (0..Label::COUNT).map(|i| if i == index { p } else { rest }).collect()
    }

    #[test]
    fn test_top_k_order() {
        let mut probs = one_hot(3, 0.5);
        probs[9] = 0.3;
        let dist = ClassDistribution::from_probabilities(probs).unwrap();
        let top = dist.top_k(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, Label::Melanoma);
        assert_eq!(top[1].0, Label::Eczema);
        assert!(top[1].1 >= top[2].1);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = ClassDistribution::from_probabilities(vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, OracleError::InvalidOutput(_)));
    }

    #[test]
    fn test_nan_rejected() {
        let mut probs = one_hot(0, 0.9);
        probs[1] = f32::NAN;
        assert!(ClassDistribution::from_probabilities(probs).is_err());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let logits: Vec<f32> = (0..Label::COUNT).map(|i| i as f32 * 0.3).collect();
        let dist = ClassDistribution::from_logits(&logits).unwrap();
        let sum: f32 = dist.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(dist.top_k(1)[0].0, Label::AcnePimples);
    }
}
