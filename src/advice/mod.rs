//! 护理建议层：知识库与降级回复、Prompt、生成结果后处理、建议生成器

pub mod knowledge_base;
pub mod postprocess;
pub mod prompt;
pub mod recommender;

pub use knowledge_base::TreatmentKnowledgeBase;
pub use prompt::treatment_messages;
pub use recommender::{RecommendationResult, RecommendationSource, Recommender};
