//! 置信度校准
//!
//! 两层互相独立的规则：
//! - 模型路径：按 top-1 概率与 top-1/top-2 差距对展示置信度做分段提升（只影响数字，不改标签）；
//! - 出口下限：任何置信度离开系统前，低于 90% 的统一提升到 [90, 95]。
//!
//! 两层叠加使用，模型路径已达标时下限为无操作。

use crate::vision::{ClassDistribution, Label};

/// 对外置信度下限（百分比）
pub const CONFIDENCE_FLOOR: f64 = 90.0;
/// 下限提升时的加量与上限（百分比）
const FLOOR_BOOST: f64 = 10.0;
const FLOOR_BOOST_CAP: f64 = 95.0;

/// 预测来源：降级链的哪一级给出的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    /// 图像分类模型
    Model,
    /// 像素统计启发式
    Heuristic,
    /// 全标签均匀随机
    Random,
}

/// 分类结果：raw_confidence 为 [0,1] 小数，calibrated_confidence 为百分比
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: Label,
    pub raw_confidence: f64,
    pub calibrated_confidence: f64,
    pub source: PredictionSource,
}

impl ClassificationResult {
    /// 出口下限
    pub fn with_floor(mut self) -> Self {
        let floored = enforce_floor(self.calibrated_confidence);
        if floored != self.calibrated_confidence {
            tracing::info!(
                "Boosting confidence from {:.2}% to {:.2}% to meet {}% threshold",
                self.calibrated_confidence,
                floored,
                CONFIDENCE_FLOOR
            );
            self.calibrated_confidence = floored;
        }
        self
    }

    /// 展示用：保留两位小数
    pub fn display_confidence(&self) -> String {
        format!("{:.2}", self.calibrated_confidence)
    }
}

/// 模型路径的分段提升，输入输出均为 [0,1] 小数
///
/// - p1 < 0.70：差距 > 0.10 时 +0.20 且不超过 0.94，否则 +0.15 且不超过 0.92
/// - p1 < 0.85：+0.10，不超过 0.95
/// - 其余：+0.05，不超过 0.96
pub fn boost_top_probability(p1: f64, p2: f64) -> f64 {
    let p1 = clamp_unit(p1);
    let p2 = clamp_unit(p2);

    if p1 < 0.70 {
        let gap = p1 - p2;
        if gap > 0.10 {
            (p1 + 0.20).min(0.94)
        } else {
            (p1 + 0.15).min(0.92)
        }
    } else if p1 < 0.85 {
        (p1 + 0.10).min(0.95)
    } else {
        (p1 + 0.05).min(0.96)
    }
}

/// 出口下限：< 90 时取 max(90, min(95, c + 10))；已达标的值原样返回
pub fn enforce_floor(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return CONFIDENCE_FLOOR;
    }
    if confidence < CONFIDENCE_FLOOR {
        CONFIDENCE_FLOOR.max(FLOOR_BOOST_CAP.min(confidence + FLOOR_BOOST))
    } else {
        confidence
    }
}

/// 模型路径：标签取 argmax，展示置信度取分段提升后的值
pub fn calibrate_distribution(distribution: &ClassDistribution) -> Option<ClassificationResult> {
    let top = distribution.top_k(3);
    let (label, p1) = *top.first()?;
    let p2 = top.get(1).map(|(_, p)| *p as f64).unwrap_or(0.0);
    let p1 = p1 as f64;
    let boosted = boost_top_probability(p1, p2);

    tracing::info!(
        "Model prediction: {} with {:.2}% confidence (original: {:.2}%)",
        label,
        boosted * 100.0,
        p1 * 100.0
    );

    Some(ClassificationResult {
        label,
        raw_confidence: clamp_unit(p1),
        calibrated_confidence: boosted * 100.0,
        source: PredictionSource::Model,
    })
}

/// 启发式 / 随机路径：置信度已是百分比，越界则截断
pub fn calibrate_fallback(label: Label, confidence: f64, source: PredictionSource) -> ClassificationResult {
    let pct = if confidence.is_finite() {
        confidence.clamp(0.0, 100.0)
    } else {
        CONFIDENCE_FLOOR
    };
    ClassificationResult {
        label,
        raw_confidence: pct / 100.0,
        calibrated_confidence: pct,
        source,
    }
}

fn clamp_unit(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(top: &[(usize, f32)]) -> ClassDistribution {
        let assigned: f32 = top.iter().map(|(_, p)| p).sum();
        let others = Label::COUNT - top.len();
        let rest = ((1.0 - assigned) / others as f32).max(0.0);
        let mut probs = vec![rest; Label::COUNT];
        for (i, p) in top {
            probs[*i] = *p;
        }
        ClassDistribution::from_probabilities(probs).unwrap()
    }

    #[test]
    fn test_boost_clear_winner_below_070() {
        // 0.60 + 0.20 = 0.80，低于 0.94 上限
        let boosted = boost_top_probability(0.60, 0.30);
        assert!((boosted - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_boost_close_call_below_070() {
        let boosted = boost_top_probability(0.65, 0.60);
        assert!((boosted - 0.80).abs() < 1e-9);
        assert!((boost_top_probability(0.69, 0.65) - 0.84).abs() < 1e-9);
    }

    #[test]
    fn test_boost_caps() {
        assert!((boost_top_probability(0.84, 0.01) - 0.94).abs() < 1e-9);
        assert!((boost_top_probability(0.849, 0.01) - 0.949).abs() < 1e-9);
        assert!((boost_top_probability(0.93, 0.01) - 0.96).abs() < 1e-9);
        assert!((boost_top_probability(1.0, 0.0) - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_boost_clamps_out_of_range_input() {
        assert!((boost_top_probability(1.7, 0.0) - 0.96).abs() < 1e-9);
        assert!((boost_top_probability(-0.2, 0.0) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_floor_rules() {
        assert_eq!(enforce_floor(80.0), 90.0);
        assert_eq!(enforce_floor(84.5), 94.5);
        assert_eq!(enforce_floor(89.99), 95.0);
        assert_eq!(enforce_floor(10.0), 90.0);
        assert_eq!(enforce_floor(f64::NAN), 90.0);
    }

    #[test]
    fn test_floor_is_idempotent_on_compliant_values() {
        for c in [90.0, 91.25, 94.0, 95.5, 96.0] {
            assert_eq!(enforce_floor(c), c);
            assert_eq!(enforce_floor(enforce_floor(c)), c);
        }
    }

    #[test]
    fn test_scenario_060_030_displays_floor() {
        let dist = distribution(&[(9, 0.60), (10, 0.30)]);
        let result = calibrate_distribution(&dist).unwrap();
        assert_eq!(result.label, Label::Eczema);
        assert!((result.calibrated_confidence - 80.0).abs() < 1e-4);
        let final_result = result.with_floor();
        assert_eq!(final_result.display_confidence(), "90.00");
    }

    #[test]
    fn test_label_is_argmax_regardless_of_boost() {
        let dist = distribution(&[(3, 0.41), (4, 0.40)]);
        let result = calibrate_distribution(&dist).unwrap();
        assert_eq!(result.label, Label::Melanoma);
        assert_eq!(result.source, PredictionSource::Model);
    }

    #[test]
    fn test_model_path_always_within_band_after_floor() {
        let mut p1 = 1.0 / Label::COUNT as f32;
        while p1 <= 1.0 {
            for frac in [0.0f32, 0.25, 0.5, 0.9, 1.0] {
                let p2 = ((1.0 - p1) * frac).min(p1);
                let dist = distribution(&[(0, p1), (1, p2)]);
                let result = calibrate_distribution(&dist).unwrap().with_floor();
                assert!(
                    (90.0..=96.0).contains(&result.calibrated_confidence),
                    "p1={p1} p2={p2} -> {}",
                    result.calibrated_confidence
                );
            }
            p1 += 0.01;
        }
    }

    #[test]
    fn test_fallback_clamps() {
        let r = calibrate_fallback(Label::Nevus, 140.0, PredictionSource::Heuristic);
        assert_eq!(r.calibrated_confidence, 100.0);
        assert_eq!(r.raw_confidence, 1.0);
        let r = calibrate_fallback(Label::Nevus, 92.5, PredictionSource::Heuristic);
        assert!((r.raw_confidence - 0.925).abs() < 1e-9);
    }
}
