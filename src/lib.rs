//! SkinOAI - 皮肤状况识别与护理建议服务
//!
//! 模块划分：
//! - **advice**: 护理建议（知识库降级回复、Prompt、生成结果后处理、建议生成器）
//! - **calibration**: 置信度校准（模型路径分段提升 + 出口下限）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、模型懒加载守卫、请求阶段、预测编排器
//! - **llm**: 文本生成客户端抽象与实现（OpenAI 兼容 / DeepSeek / Scripted）
//! - **observability**: 日志初始化
//! - **server**: axum HTTP 接口
//! - **vision**: 标签、图像解码与统计、图像分类模型抽象、启发式降级

pub mod advice;
pub mod calibration;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod server;
pub mod vision;

pub use crate::core::{Prediction, Predictor};
