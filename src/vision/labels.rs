//! 皮肤状况标签（固定 15 类）
//!
//! 枚举顺序即图像分类模型输出向量的下标顺序。

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    ActinicKeratosis,
    BasalCellCarcinoma,
    DermatoFibroma,
    Melanoma,
    Nevus,
    PigmentedBenignKeratosis,
    SeborrheicKeratosis,
    SquamousCellCarcinoma,
    VascularLesion,
    Eczema,
    AtopicDermatitis,
    Psoriasis,
    TineaRingwormCandidiasis,
    WartsMolluscum,
    AcnePimples,
}

impl Label {
    /// 全部标签，按模型输出下标排列
    pub const ALL: [Label; 15] = [
        Label::ActinicKeratosis,
        Label::BasalCellCarcinoma,
        Label::DermatoFibroma,
        Label::Melanoma,
        Label::Nevus,
        Label::PigmentedBenignKeratosis,
        Label::SeborrheicKeratosis,
        Label::SquamousCellCarcinoma,
        Label::VascularLesion,
        Label::Eczema,
        Label::AtopicDermatitis,
        Label::Psoriasis,
        Label::TineaRingwormCandidiasis,
        Label::WartsMolluscum,
        Label::AcnePimples,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// 对外展示名（也是知识库的键）
    pub fn name(self) -> &'static str {
        match self {
            Label::ActinicKeratosis => "Actinic Keratosis",
            Label::BasalCellCarcinoma => "Basal Cell Carcinoma",
            Label::DermatoFibroma => "Dermato Fibroma",
            Label::Melanoma => "Melanoma",
            Label::Nevus => "Nevus",
            Label::PigmentedBenignKeratosis => "Pigmented Benign Keratosis",
            Label::SeborrheicKeratosis => "Seborrheic Keratosis",
            Label::SquamousCellCarcinoma => "Squamous Cell Carcinoma",
            Label::VascularLesion => "Vascular Lesion",
            Label::Eczema => "Eczema",
            Label::AtopicDermatitis => "Atopic Dermatitis",
            Label::Psoriasis => "Psoriasis",
            Label::TineaRingwormCandidiasis => "Tinea Ringworm Candidiasis",
            Label::WartsMolluscum => "Warts Molluscum",
            Label::AcnePimples => "Acne/Pimples",
        }
    }

    pub fn from_index(index: usize) -> Option<Label> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Label> {
        Self::ALL.iter().copied().find(|l| l.name() == name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 启发式规则命中的候选集合
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionGroup {
    /// 偏红且纹理杂乱：炎症类
    Inflammatory,
    /// 整体偏暗：恶性形态
    MalignantPattern,
    /// 颜色均匀：色素均匀类
    UniformPigmented,
    /// 其余
    MixedPattern,
}

impl ConditionGroup {
    pub fn candidates(self) -> &'static [Label] {
        match self {
            ConditionGroup::Inflammatory => &[
                Label::Eczema,
                Label::AtopicDermatitis,
                Label::Psoriasis,
                Label::AcnePimples,
            ],
            ConditionGroup::MalignantPattern => &[
                Label::Melanoma,
                Label::BasalCellCarcinoma,
                Label::SquamousCellCarcinoma,
            ],
            ConditionGroup::UniformPigmented => &[
                Label::Nevus,
                Label::SeborrheicKeratosis,
                Label::PigmentedBenignKeratosis,
            ],
            ConditionGroup::MixedPattern => &[
                Label::DermatoFibroma,
                Label::ActinicKeratosis,
                Label::VascularLesion,
                Label::WartsMolluscum,
            ],
        }
    }

    /// 命中该规则时的基础置信度（百分比）
    pub fn base_confidence(self) -> f64 {
        match self {
            ConditionGroup::Inflammatory => 92.0,
            ConditionGroup::MalignantPattern => 94.0,
            ConditionGroup::UniformPigmented => 93.0,
            ConditionGroup::MixedPattern => 91.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip_for_every_label() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(Label::from_name(label.name()), Some(*label));
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(Label::COUNT), None);
        assert_eq!(Label::from_name("Sunburn"), None);
    }

    #[test]
    fn test_candidate_sets_are_disjoint_and_cover_all_but_tinea() {
        let groups = [
            ConditionGroup::Inflammatory,
            ConditionGroup::MalignantPattern,
            ConditionGroup::UniformPigmented,
            ConditionGroup::MixedPattern,
        ];
        let mut seen = Vec::new();
        for g in groups {
            for l in g.candidates() {
                assert!(!seen.contains(l), "{l} appears twice");
                seen.push(*l);
            }
        }
        assert_eq!(seen.len(), 14);
        assert!(!seen.contains(&Label::TineaRingwormCandidiasis));
    }
}
