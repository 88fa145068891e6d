use crate::domain::model::{
    ExternalStorageLocation, Operation, PayloadStream, PayloadType, Request,
};
use crate::utils::error::Result;
use std::io::{self, Read, Write};
use url::Url;

/// 大型 payload 的外部儲存介面
pub trait ExternalPayloadStorage: Send + Sync {
    /// 取得 payload 的外部儲存位置
    fn get_location(
        &self,
        operation: Operation,
        payload_type: PayloadType,
    ) -> Result<ExternalStorageLocation>;

    /// 將 `payload` 的 `payload_size` 個位元組上傳到 `path`
    fn upload(&self, path: &str, payload: &mut dyn Read, payload_size: u64) -> Result<()>;

    /// 從 `path` 下載；遠端沒有內容時回傳 `None`
    fn download(&self, path: &str) -> Result<Option<PayloadStream>>;
}

/// 開啟綁定單一 URL 的連線
pub trait Transport: Send + Sync {
    type Connection: Connection + 'static;

    fn open(&self, url: &Url, request: Request) -> io::Result<Self::Connection>;
}

/// 一次請求/回應交換。寫入為請求 body，讀取為回應 body；drop 即釋放連線。
pub trait Connection: Read + Write + Send {
    /// 結束請求 body（若有）並等待回應狀態碼
    fn status(&mut self) -> io::Result<u16>;
}
