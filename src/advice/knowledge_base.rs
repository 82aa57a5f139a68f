//! 护理建议知识库与降级回复
//!
//! 标签名 → 有序建议列表（顺序即展示优先级）。未收录的标签使用通用列表。
//! 文本生成模型不可用、出错或返回空内容时，由 `compose_fallback` 生成完整回复。

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::KnowledgeBaseError;
use crate::vision::Label;

/// 通用皮肤健康建议（固定 4 行）
const GENERAL_GUIDELINES: [&str; 4] = [
    "Maintain a balanced diet rich in vitamins A, C, and E",
    "Stay hydrated with adequate water intake",
    "Get sufficient sleep for skin repair and regeneration",
    "Manage stress through relaxation techniques",
];

const DISCLAIMER_HEADER: &str = "⚠️ IMPORTANT MEDICAL DISCLAIMER:";
const DISCLAIMER_BODY: &str = "This AI-generated advice is for informational purposes only and should not replace professional medical consultation. \
Please consult with a board-certified dermatologist for accurate diagnosis, personalized treatment plans, and proper medical supervision. \
Seek immediate medical attention if you notice rapid changes, bleeding, or concerning symptoms.";

const GENERIC_TREATMENTS: [&str; 5] = [
    "Keep the affected area clean and dry",
    "Apply gentle, fragrance-free moisturizer",
    "Avoid scratching or irritating the area",
    "Monitor for changes in appearance",
    "Protect from sun exposure with appropriate clothing and sunscreen",
];

const BUILTIN_TREATMENTS: [(&str, [&str; 5]); 10] = [
    (
        "Eczema",
        [
            "Apply fragrance-free moisturizer immediately after bathing",
            "Use mild, soap-free cleansers",
            "Consider over-the-counter hydrocortisone cream for inflammation",
            "Identify and avoid known triggers (stress, allergens, irritants)",
            "Wear soft, breathable cotton clothing",
        ],
    ),
    (
        "Atopic Dermatitis",
        [
            "Maintain consistent skincare routine with hypoallergenic products",
            "Apply topical corticosteroids as directed by healthcare provider",
            "Use lukewarm water for bathing and limit bath time",
            "Consider antihistamines for itching relief",
            "Implement stress management techniques",
        ],
    ),
    (
        "Psoriasis",
        [
            "Apply moisturizers containing ceramides or urea",
            "Consider coal tar preparations for scaling",
            "Use salicylic acid products to remove scales",
            "Maintain healthy lifestyle with regular exercise",
            "Limit alcohol consumption and manage stress",
        ],
    ),
    (
        "Acne/Pimples",
        [
            "Use gentle, non-comedogenic cleansers twice daily",
            "Apply benzoyl peroxide or salicylic acid treatments",
            "Avoid touching or picking at affected areas",
            "Use oil-free, non-comedogenic moisturizers",
            "Consider retinoid treatments for persistent cases",
        ],
    ),
    (
        "Melanoma",
        [
            "Seek immediate dermatological evaluation",
            "Perform regular self-examinations using ABCDE criteria",
            "Use broad-spectrum SPF 30+ sunscreen daily",
            "Avoid UV exposure during peak hours (10 AM - 4 PM)",
            "Consider professional skin mapping and monitoring",
        ],
    ),
    (
        "Basal Cell Carcinoma",
        [
            "Schedule prompt dermatological consultation",
            "Protect area from further sun exposure",
            "Use broad-spectrum sunscreen with SPF 30 or higher",
            "Avoid picking or scratching the affected area",
            "Consider Mohs surgery for complete removal",
        ],
    ),
    (
        "Squamous Cell Carcinoma",
        [
            "Seek immediate medical evaluation",
            "Protect from UV radiation with clothing and sunscreen",
            "Avoid immunosuppressive factors when possible",
            "Monitor for signs of growth or changes",
            "Discuss treatment options including surgical removal",
        ],
    ),
    (
        "Nevus",
        [
            "Monitor for changes in size, color, or texture",
            "Perform monthly self-examinations",
            "Use sun protection to prevent changes",
            "Schedule annual dermatological screenings",
            "Document appearance with photos for comparison",
        ],
    ),
    (
        "Seborrheic Keratosis",
        [
            "No treatment required unless cosmetically bothersome",
            "Avoid irritation from clothing or jewelry",
            "Monitor for unusual changes in appearance",
            "Consider removal if frequently irritated",
            "Protect from sun exposure to prevent new lesions",
        ],
    ),
    (
        "Warts Molluscum",
        [
            "Avoid touching or scratching to prevent spread",
            "Keep affected area clean and dry",
            "Consider over-the-counter wart treatments with salicylic acid",
            "Boost immune system with proper nutrition and rest",
            "Practice good hygiene to prevent transmission",
        ],
    ),
];

/// 知识库覆盖文件格式
///
/// ```toml
/// generic = ["..."]
///
/// [treatments]
/// "Eczema" = ["...", "..."]
/// ```
#[derive(Debug, Deserialize)]
struct KnowledgeBaseFile {
    generic: Option<Vec<String>>,
    #[serde(default)]
    treatments: HashMap<String, Vec<String>>,
}

/// 只读知识库：构造后不再修改，可在请求间共享
#[derive(Debug, Clone)]
pub struct TreatmentKnowledgeBase {
    treatments: HashMap<String, Vec<String>>,
    generic: Vec<String>,
}

impl Default for TreatmentKnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TreatmentKnowledgeBase {
    /// 内置表：10 种状况，各 5 条
    pub fn builtin() -> Self {
        let treatments = BUILTIN_TREATMENTS
            .iter()
            .map(|(name, items)| {
                (
                    name.to_string(),
                    items.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self {
            treatments,
            generic: GENERIC_TREATMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn new(treatments: HashMap<String, Vec<String>>, generic: Vec<String>) -> Self {
        Self { treatments, generic }
    }

    /// 从 TOML 文件加载；未给 generic 时沿用内置通用列表
    pub fn from_toml_str(content: &str) -> Result<Self, KnowledgeBaseError> {
        let file: KnowledgeBaseFile = toml::from_str(content)?;

        for (name, items) in &file.treatments {
            if Label::from_name(name).is_none() {
                tracing::warn!("Knowledge base entry '{}' does not match any label", name);
            }
            if items.is_empty() {
                return Err(KnowledgeBaseError::EmptyEntry(name.clone()));
            }
        }

        let generic = match file.generic {
            Some(g) if g.is_empty() => return Err(KnowledgeBaseError::EmptyGeneric),
            Some(g) => g,
            None => GENERIC_TREATMENTS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self::new(file.treatments, generic))
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn contains(&self, label: Label) -> bool {
        self.treatments.contains_key(label.name())
    }

    /// 标签对应的建议；未收录时返回通用列表
    pub fn recommendations(&self, label: Label) -> &[String] {
        self.treatments
            .get(label.name())
            .map(Vec::as_slice)
            .unwrap_or(&self.generic)
    }

    /// 组合降级回复：编号建议 + 4 行通用建议 + 免责声明
    pub fn compose_fallback(&self, label: Label) -> String {
        let mut response = format!("Professional Treatment Recommendations for {}:\n\n", label);

        for (i, item) in self.recommendations(label).iter().enumerate() {
            response.push_str(&format!("{}. {}\n", i + 1, item));
        }

        response.push_str("\nGeneral Skin Health Guidelines:\n");
        for line in GENERAL_GUIDELINES {
            response.push_str(&format!("• {}\n", line));
        }

        response.push('\n');
        response.push_str(DISCLAIMER_HEADER);
        response.push('\n');
        response.push_str(DISCLAIMER_BODY);
        response
    }
}
