//! HTTP 接口
//!
//! - GET  /         健康检查
//! - GET  /ping     连通性测试
//! - POST /predict  皮肤状况识别 + 护理建议

pub mod response;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::Instrument;

use crate::core::{PredictError, Predictor};

pub use response::{ApiError, PredictResponse, StatusResponse};

/// 服务状态：预测器在请求间共享（内部模型单例自行保证初始化一次）
pub struct AppState {
    pub predictor: Predictor,
}

pub fn create_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/ping", get(ping))
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn home() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "SkinOAI API is running!",
        status: Some("healthy"),
    })
}

async fn ping() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "pong",
        status: None,
    })
}

/// 与 Flask 的 is_json 一致：application/json 或 application/*+json
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);
    handle_predict(&state.predictor, &headers, body)
        .instrument(span)
        .await
}

async fn handle_predict(
    predictor: &Predictor,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    // 超过 max_body_bytes 时 axum 在提取阶段拒绝；统一走 {"error": ...} 响应
    let body = body.map_err(|e| PredictError::BodyUnreadable(e.body_text()))?;
    if !is_json_content_type(headers) {
        return Err(PredictError::NotJson.into());
    }
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Malformed JSON body: {}", e);
        PredictError::NotJson
    })?;

    let mut prediction = predictor.predict_json(&payload).await?;
    let response = PredictResponse::from(&prediction);
    prediction.mark_responded()?;
    tracing::info!(phase = %prediction.phase(), "Prediction complete");
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        h
    }

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type(&headers("application/json")));
        assert!(is_json_content_type(&headers("application/json; charset=utf-8")));
        assert!(is_json_content_type(&headers("application/vnd.api+json")));
        assert!(!is_json_content_type(&headers("text/plain")));
        assert!(!is_json_content_type(&headers("multipart/form-data; boundary=x")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }
}
