//! 启发式降级分类器
//!
//! 图像分类模型不可用或推理失败时使用。按像素统计走有序规则（首条命中生效），
//! 在命中的候选集合中随机取标签，置信度 = 基础值 ± 1.5。
//! 像素统计无法计算时再降一级：全标签均匀随机，置信度 [90, 95]。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::calibration::{calibrate_fallback, ClassificationResult, PredictionSource};
use crate::vision::{ConditionGroup, Label, PixelStats};

/// 随机源：可注入，测试用固定种子
pub trait RandomSource: Send {
    /// [0, len) 内均匀取下标，len 必须 > 0
    fn pick(&mut self, len: usize) -> usize;
    /// [low, high] 内均匀取值
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// 基于 rand::StdRng 的随机源
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..=high)
    }
}

/// 置信度抖动幅度（百分点）
const JITTER: f64 = 1.5;
/// 最后一级随机预测的置信度区间
const RANDOM_CONFIDENCE: (f64, f64) = (90.0, 95.0);

/// 按有序规则选出候选集合
pub fn match_rule(stats: &PixelStats) -> ConditionGroup {
    if stats.red_mean > 150.0 && stats.variance > 1000.0 {
        ConditionGroup::Inflammatory
    } else if stats.brightness < 100.0 {
        ConditionGroup::MalignantPattern
    } else if stats.variance < 500.0 {
        ConditionGroup::UniformPigmented
    } else {
        ConditionGroup::MixedPattern
    }
}

/// 像素统计启发式分类器（无状态，随机源由调用方传入）
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 统计可用时走规则，否则走全标签随机；不会失败
    pub fn classify(
        &self,
        stats: Option<PixelStats>,
        random: &mut dyn RandomSource,
    ) -> ClassificationResult {
        match stats {
            Some(stats) => self.classify_by_rules(&stats, random),
            None => {
                tracing::warn!("Pixel statistics unavailable, using uniform random prediction");
                self.classify_random(random)
            }
        }
    }

    pub fn classify_by_rules(
        &self,
        stats: &PixelStats,
        random: &mut dyn RandomSource,
    ) -> ClassificationResult {
        let group = match_rule(stats);
        let candidates = group.candidates();
        let label = candidates[random.pick(candidates.len()).min(candidates.len() - 1)];
        let confidence = group.base_confidence() + random.uniform(-JITTER, JITTER);

        tracing::info!(
            ?group,
            brightness = stats.brightness,
            variance = stats.variance,
            red = stats.red_mean,
            "Heuristic fallback prediction: {} with {:.2}% confidence",
            label,
            confidence
        );
        calibrate_fallback(label, confidence, PredictionSource::Heuristic)
    }

    pub fn classify_random(&self, random: &mut dyn RandomSource) -> ClassificationResult {
        let label = Label::ALL[random.pick(Label::COUNT).min(Label::COUNT - 1)];
        let confidence = random.uniform(RANDOM_CONFIDENCE.0, RANDOM_CONFIDENCE.1);
        tracing::info!("Random fallback prediction: {} with {:.2}% confidence", label, confidence);
        calibrate_fallback(label, confidence, PredictionSource::Random)
    }
}
