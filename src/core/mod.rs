//! 核心编排层：错误类型、模型懒加载守卫、请求阶段、预测编排器

pub mod error;
pub mod oracle;
pub mod orchestrator;
pub mod state;

pub use error::{KnowledgeBaseError, OracleError, PredictError};
pub use oracle::LazyOracle;
pub use orchestrator::{OracleStatus, Prediction, PredictionRequest, Predictor};
pub use state::{PhaseTracker, RequestPhase};
