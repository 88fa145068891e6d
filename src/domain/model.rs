use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// 外部 payload 的存取方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadType {
    WorkflowInput,
    WorkflowOutput,
    TaskInput,
    TaskOutput,
}

/// 協調端簽發的外部儲存位置；`uri` 為預簽名 URL，`path` 為物件鍵
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalStorageLocation {
    pub uri: String,
    pub path: String,
}

impl ExternalStorageLocation {
    pub fn new(uri: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            path: path.into(),
        }
    }

    /// 從協調端回應的 JSON 解析
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

/// 單次傳輸的請求：GET 無 body，PUT 帶固定長度的 body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Get,
    Put { content_length: u64 },
}

impl Request {
    pub fn method(&self) -> Method {
        match self {
            Request::Get => Method::Get,
            Request::Put { .. } => Method::Put,
        }
    }
}

/// 下載成功時交給呼叫端的資料流，持有底層連線，drop 即釋放
pub type PayloadStream = Box<dyn Read + Send>;
