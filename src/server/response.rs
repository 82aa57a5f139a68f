//! HTTP 响应体与错误映射

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::{Prediction, PredictError};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

/// POST /predict 成功响应
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_class: String,
    /// 百分比字符串，两位小数
    pub confidence: String,
    pub recommendation: String,
}

impl From<&Prediction> for PredictResponse {
    fn from(p: &Prediction) -> Self {
        Self {
            predicted_class: p.predicted_class().to_string(),
            confidence: p.confidence(),
            recommendation: p.recommendation.text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// 对外只返回固定消息；细节写日志
#[derive(Debug)]
pub struct ApiError(pub PredictError);

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            tracing::warn!("Rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.public_message(),
            }),
        )
            .into_response()
    }
}
