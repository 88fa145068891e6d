use crate::utils::error::{PayloadStorageError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;
pub const MAX_CHUNK_SIZE: usize = 8 * 1024 * 1024;
pub const DEFAULT_PIPE_DEPTH: usize = 4;
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// 每次寫入連線的區塊大小（位元組）
    pub chunk_size: usize,
    /// 上傳時在傳送執行緒前排隊的區塊數
    pub pipe_depth: usize,
    pub connect_timeout_seconds: Option<u64>,
    /// 整體交換期限；未設定時不限制
    pub timeout_seconds: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pipe_depth: DEFAULT_PIPE_DEPTH,
            connect_timeout_seconds: Some(DEFAULT_CONNECT_TIMEOUT_SECONDS),
            timeout_seconds: None,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_seconds.map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl TransferConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PayloadStorageError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CHUNK_SIZE})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

impl Validate for TransportConfig {
    fn validate(&self) -> Result<()> {
        validate_range("transport.chunk_size", self.chunk_size, 1, MAX_CHUNK_SIZE)?;
        validate_range("transport.pipe_depth", self.pipe_depth, 1, 1024)?;

        if let Some(seconds) = self.connect_timeout_seconds {
            validate_positive_number("transport.connect_timeout_seconds", seconds, 1)?;
        }
        if let Some(seconds) = self.timeout_seconds {
            validate_positive_number("transport.timeout_seconds", seconds, 1)?;
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(PayloadStorageError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.level.clone(),
                reason: "Value cannot be empty or whitespace-only".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for TransferConfig {
    fn validate(&self) -> Result<()> {
        self.transport.validate()?;
        self.logging.validate()
    }
}
