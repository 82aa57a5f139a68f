//! 预测流程的错误类型
//!
//! PredictError：请求级错误，只有输入校验阶段的错误会终止请求（400），其余为内部错误（500）。
//! OracleError：外部模型（图像分类 / 文本生成）的不可用或推理失败，总是被降级路径吸收，不会返回给调用方。
//! KnowledgeBaseError：知识库覆盖文件加载失败，只在启动时出现。

use std::path::PathBuf;

use thiserror::Error;

use crate::core::state::RequestPhase;

/// 请求级错误；Display 带内部细节（写日志用），对外消息见 `public_message`
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Request must be JSON")]
    NotJson,

    /// 请求体读取失败（超过大小上限或连接中断）
    #[error("Request body unreadable: {0}")]
    BodyUnreadable(String),

    #[error("Image data is required")]
    MissingImage,

    #[error("Invalid image data: {0}")]
    ImageDecode(String),

    #[error("Image prediction failed: {0}")]
    ClassificationFailed(String),

    /// 阶段顺序被破坏，属于编程错误
    #[error("Illegal phase transition {from} -> {to}")]
    IllegalTransition { from: RequestPhase, to: RequestPhase },
}

impl PredictError {
    /// 返回给用户的固定消息，不暴露内部异常细节
    pub fn public_message(&self) -> &'static str {
        match self {
            PredictError::NotJson | PredictError::BodyUnreadable(_) => "Request must be JSON",
            PredictError::MissingImage => "Image data is required",
            PredictError::ImageDecode(_) => "Invalid image data",
            PredictError::ClassificationFailed(_) => "Image prediction failed",
            PredictError::IllegalTransition { .. } => "Internal server error",
        }
    }

    /// 是否为输入校验错误（客户端错误，HTTP 400）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::NotJson
                | PredictError::BodyUnreadable(_)
                | PredictError::MissingImage
                | PredictError::ImageDecode(_)
        )
    }
}

/// 外部模型错误：由降级链处理
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle inference failed: {0}")]
    Inference(String),

    #[error("Oracle timed out after {0}s")]
    Timeout(u64),

    #[error("Oracle returned invalid output: {0}")]
    InvalidOutput(String),
}

/// 知识库覆盖文件错误
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("Failed to read knowledge base {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse knowledge base: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Knowledge base entry '{0}' has no recommendations")]
    EmptyEntry(String),

    #[error("Generic recommendation list is empty")]
    EmptyGeneric,
}
