//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SKINOAI__*` 覆盖（双下划线表示嵌套，如 `SKINOAI__SERVER__PORT=8080`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::GenerationOptions;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub classifier: ClassifierSection,
    pub llm: LlmSection,
    pub knowledge_base: KnowledgeBaseSection,
}

/// [server] 段：监听地址与请求体上限
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// base64 图片体积较大，默认 16 MiB
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

/// [classifier] 段：远程图像分类服务；未配置 endpoint 时走启发式降级
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSection {
    pub endpoint: Option<String>,
    /// 单次推理超时（秒），0 表示不设超时
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_classifier_timeout(),
        }
    }
}

fn default_classifier_timeout() -> u64 {
    30
}

/// [llm] 段：后端选择、生成参数与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmModelOverride,
    #[serde(default)]
    pub openai: LlmModelOverride,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            deepseek: LlmModelOverride::default(),
            openai: LlmModelOverride::default(),
            timeouts: LlmTimeoutsSection::default(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmSection {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmModelOverride {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次生成超时（秒），0 表示不设超时
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [knowledge_base] 段：可选的护理建议表覆盖文件
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KnowledgeBaseSection {
    pub path: Option<PathBuf>,
}

/// 从 config 目录加载配置，环境变量 SKINOAI__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SKINOAI__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!("Config file {} not found, ignoring", path.display());
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SKINOAI")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.classifier.endpoint.is_none());
        assert_eq!(cfg.llm.generation_options(), GenerationOptions::default());
        assert_eq!(cfg.llm.timeouts.request, 60);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8081\n\n[classifier]\nendpoint = \"http://127.0.0.1:9000/classify\"\ntimeout_secs = 5\n\n[llm]\nprovider = \"openai\"\nmax_tokens = 128"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.server.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.classifier.endpoint.as_deref(), Some("http://127.0.0.1:9000/classify"));
        assert_eq!(cfg.classifier.timeout_secs, 5);
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.max_tokens, 128);
        assert!((cfg.llm.temperature - 0.7).abs() < f32::EPSILON);
    }
}
