//! 外部模型的一次性初始化守卫
//!
//! 图像分类与文本生成模型都是进程级单例，首次需要时才加载。
//! 用 tokio OnceCell 保证并发的首批请求只会触发一次成功的加载；加载失败不缓存，下一次请求重试。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::core::OracleError;

/// 加载函数：返回已就绪的模型，或说明为何不可用
pub type OracleLoader<T> = Box<dyn Fn() -> Result<Arc<T>, OracleError> + Send + Sync>;

/// 懒加载的模型单例
pub struct LazyOracle<T: ?Sized> {
    name: &'static str,
    cell: OnceCell<Arc<T>>,
    loader: OracleLoader<T>,
}

impl<T: ?Sized + Send + Sync> LazyOracle<T> {
    pub fn new(
        name: &'static str,
        loader: impl Fn() -> Result<Arc<T>, OracleError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            cell: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// 已就绪的模型（测试与显式注入用）
    pub fn ready(name: &'static str, oracle: Arc<T>) -> Self {
        Self {
            name,
            cell: OnceCell::new_with(Some(oracle)),
            loader: Box::new(move || Err(OracleError::Unavailable(format!("{name} already loaded")))),
        }
    }

    /// 永远不可用的模型
    pub fn absent(name: &'static str) -> Self {
        Self::new(name, move || {
            Err(OracleError::Unavailable(format!("no {name} configured")))
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// 取得模型；未加载时加载一次，并发调用方等待同一次加载
    pub async fn get(&self) -> Result<Arc<T>, OracleError> {
        let oracle = self
            .cell
            .get_or_try_init(|| async {
                tracing::info!("Initializing {}...", self.name);
                match (self.loader)() {
                    Ok(oracle) => {
                        tracing::info!("{} initialized successfully", self.name);
                        Ok(oracle)
                    }
                    Err(e) => {
                        tracing::warn!("Failed to initialize {}: {}", self.name, e);
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(oracle))
    }
}

/// 在独立任务中执行一次模型调用：panic 记为推理失败，超时后取消任务
pub async fn run_guarded<T, F>(call: F, timeout: Option<Duration>) -> Result<T, OracleError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, OracleError>> + Send + 'static,
{
    let mut handle = tokio::spawn(call);
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                return Err(OracleError::Timeout(limit.as_secs()));
            }
        },
        None => handle.await,
    };
    joined.map_err(|e| OracleError::Inference(format!("oracle task failed: {e}")))?
}

/// 秒数转超时，0 表示不限
pub fn deadline_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
