use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;

/// 运行时配置文件路径的环境变量
pub const ENV_RUNTIME_CONFIG: &str = "SURVEY_RUNTIME_CONFIG";
pub const ENV_API_BASE_URL: &str = "SURVEY_API_BASE_URL";
pub const ENV_API_TIMEOUT_MS: &str = "SURVEY_API_TIMEOUT_MS";
pub const RUNTIME_CONFIG_FILE: &str = "runtime-config.json";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read runtime config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid runtime config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// 运行时注入的配置（部署时可替换，无需重新编译）
///
/// 文件格式与前端的 runtime-config 一致：
/// `{ "apiBaseUrl": "...", "apiTimeoutMs": 15000 }`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_timeout_ms: Option<Value>,
}

impl RuntimeConfig {
    /// 读取配置文件；文件不存在时返回 None
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(parsed))
    }

    /// 配置文件 + 进程环境变量（环境变量优先）
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let path = std::env::var(ENV_RUNTIME_CONFIG)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(RUNTIME_CONFIG_FILE));
        let file = Self::from_file(&path)?;
        if file.is_some() {
            info!("加载运行时配置: {}", path.display());
        }

        let env_base = std::env::var(ENV_API_BASE_URL).ok();
        let env_timeout = std::env::var(ENV_API_TIMEOUT_MS).ok();
        if file.is_none() && env_base.is_none() && env_timeout.is_none() {
            return Ok(None);
        }

        let mut runtime = file.unwrap_or_default();
        if let Some(base) = env_base {
            runtime.api_base_url = Some(base);
        }
        if let Some(timeout) = env_timeout {
            runtime.api_timeout_ms = Some(Value::String(timeout));
        }
        Ok(Some(runtime))
    }
}

/// 编译期注入的配置
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildConfig {
    pub api_base_url: Option<&'static str>,
    pub api_timeout_ms: Option<&'static str>,
}

impl BuildConfig {
    pub fn from_build_env() -> Self {
        Self {
            api_base_url: option_env!("SURVEY_API_BASE_URL"),
            api_timeout_ms: option_env!("SURVEY_API_TIMEOUT_MS"),
        }
    }
}

/// 客户端最终使用的配置，启动时构建一次后传入 SurveyClient
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyConfig {
    pub api_base_url: String,
    pub api_timeout: Duration,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
        }
    }
}

impl SurveyConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let runtime = RuntimeConfig::from_env()?;
        Ok(Self::resolve(runtime.as_ref(), BuildConfig::from_build_env()))
    }

    /// 按 运行时 -> 编译期 -> 默认值 的顺序解析；URL 去掉末尾斜杠
    pub fn resolve(runtime: Option<&RuntimeConfig>, build: BuildConfig) -> Self {
        let base = runtime
            .and_then(|r| r.api_base_url.as_deref())
            .and_then(non_blank)
            .or_else(|| build.api_base_url.and_then(non_blank))
            .unwrap_or(DEFAULT_API_BASE_URL);

        let timeout_ms = runtime
            .and_then(|r| r.api_timeout_ms.as_ref())
            .and_then(parse_timeout_value)
            .or_else(|| build.api_timeout_ms.and_then(parse_timeout_str))
            .unwrap_or(DEFAULT_API_TIMEOUT_MS);

        Self {
            api_base_url: base.trim_end_matches('/').to_string(),
            api_timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.api_timeout.as_millis() as u64
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

fn parse_timeout_value(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64))
            .filter(|ms| *ms > 0),
        Value::String(s) => parse_timeout_str(s),
        _ => None,
    }
}

fn parse_timeout_str(s: &str) -> Option<u64> {
    match s.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(ms),
        Ok(_) => None,
        Err(_) => {
            warn!("忽略无效的超时配置: {}", s);
            None
        }
    }
}
