use crate::domain::model::Operation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadStorageError {
    #[error("Invalid location specified: {}: {reason}", redact(.location))]
    InvalidLocation {
        location: String,
        #[source]
        reason: LocationError,
    },

    #[error("Error {} {}: {source}", transfer_verb(.operation), redact(.location))]
    TransferFailed {
        operation: Operation,
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation not supported by this adapter: {capability}")]
    Unsupported { capability: &'static str },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 定位字串無法成為可傳輸 URL 的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("{0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl PayloadStorageError {
    /// 只有傳輸層失敗值得由上層重試；定位或配置錯誤重試也不會成功
    pub fn is_retryable(&self) -> bool {
        matches!(self, PayloadStorageError::TransferFailed { .. })
    }

    /// 取得出錯的定位字串（原始內容，未遮蔽）
    pub fn location(&self) -> Option<&str> {
        match self {
            PayloadStorageError::InvalidLocation { location, .. }
            | PayloadStorageError::TransferFailed { location, .. } => Some(location),
            _ => None,
        }
    }
}

fn transfer_verb(operation: &Operation) -> &'static str {
    match operation {
        Operation::Read => "downloading from",
        Operation::Write => "uploading to",
    }
}

/// 遮蔽查詢字串：預簽名 URL 的簽章都放在 query 裡，不能寫進日誌
pub fn redact(location: &str) -> String {
    match location.split_once('?') {
        Some((base, _)) => format!("{}?<redacted>", base),
        None => location.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PayloadStorageError>;
