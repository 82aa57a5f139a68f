//! SkinOAI 服务入口
//!
//! 初始化日志、加载配置、预热模型，然后启动 HTTP 服务（Ctrl+C 优雅退出）。
//! 配置文件：`--config <path>` 或环境变量 SKINOAI_CONFIG。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use skinoai::config::load_config;
use skinoai::core::Predictor;
use skinoai::observability;
use skinoai::server::{create_router, AppState};

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    std::env::var("SKINOAI_CONFIG").ok().map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(config_path_from_args()).context("Failed to load config")?;
    let predictor = Predictor::from_config(&cfg).context("Failed to build predictor")?;

    // 接收流量前先加载模型；不可用的模型由降级路径兜底
    let status = predictor.warm_up().await;
    if !status.image_model {
        tracing::warn!("Image classification model unavailable, predictions use heuristic fallback");
    }
    if !status.text_model {
        tracing::warn!("Text generation model unavailable, recommendations use knowledge base");
    }

    let state = Arc::new(AppState { predictor });
    let app = create_router(state, cfg.server.max_body_bytes);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("SkinOAI API listening on http://{}", addr);
    tracing::info!("Endpoints: GET / (health), GET /ping, POST /predict");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, shutting down");
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}
