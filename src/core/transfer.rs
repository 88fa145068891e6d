use crate::adapters::http::HttpTransport;
use crate::config::{TransferConfig, TransportConfig};
use crate::core::{
    Connection, ExternalPayloadStorage, ExternalStorageLocation, Operation, PayloadStream,
    PayloadType, Request, Transport,
};
use crate::utils::error::{redact, PayloadStorageError, Result};
use crate::utils::validation::{parse_location, Validate};
use std::io::{self, Read, Write};

const HTTP_OK: u16 = 200;

fn read_retrying(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// 在預簽名儲存 URL 上傳與下載 payload。
///
/// 每次呼叫經由 transport 開啟一條連線，並在返回前釋放；
/// 唯一例外是下載成功時，連線隨回傳的 stream 交給呼叫端。
pub struct PayloadStorage<T: Transport = HttpTransport> {
    transport: T,
    chunk_size: usize,
}

impl PayloadStorage<HttpTransport> {
    pub fn new(config: &TransferConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.transport)?;
        Ok(Self::with_transport(transport, &config.transport))
    }
}

impl<T: Transport> PayloadStorage<T> {
    pub fn with_transport(transport: T, config: &TransportConfig) -> Self {
        Self {
            transport,
            chunk_size: config.chunk_size.max(1),
        }
    }

    fn failed(operation: Operation, path: &str, source: io::Error) -> PayloadStorageError {
        PayloadStorageError::TransferFailed {
            operation,
            location: path.to_string(),
            source,
        }
    }

    /// 以固定大小的區塊將剛好 `size` 個位元組寫入連線。
    ///
    /// 最後一個區塊送出前會先確認 payload 已讀完，過長的 payload 不會留下完整的物件。
    fn copy_chunked(
        &self,
        payload: &mut dyn Read,
        size: u64,
        connection: &mut dyn Write,
    ) -> io::Result<()> {
        let mut body = Read::take(payload, size.saturating_add(1));
        let mut buf = vec![0u8; self.chunk_size];
        let mut written = 0u64;

        loop {
            let n = read_retrying(&mut body, &mut buf)?;
            if n == 0 {
                break;
            }

            let end = written + n as u64;
            if end > size || (end == size && read_retrying(&mut body, &mut [0u8; 1])? > 0) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("payload longer than declared size of {} bytes", size),
                ));
            }
            connection.write_all(&buf[..n])?;
            written = end;
        }

        if written < size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("payload ended after {} of {} bytes", written, size),
            ));
        }
        Ok(())
    }

    fn put(&self, path: &str, payload: &mut dyn Read, payload_size: u64) -> Result<()> {
        let url = parse_location(path)?;
        let failed = |e| Self::failed(Operation::Write, path, e);

        let mut connection = self
            .transport
            .open(&url, Request::Put {
                content_length: payload_size,
            })
            .map_err(failed)?;

        self.copy_chunked(payload, payload_size, &mut connection)
            .map_err(failed)?;

        let status = connection.status().map_err(failed)?;
        drop(connection);

        // 上傳不依狀態碼判斷成敗，只記錄
        if (200..300).contains(&status) {
            tracing::debug!("Upload completed with HTTP response code: {}", status);
        } else {
            tracing::warn!(
                "Upload to {} completed with HTTP response code: {}",
                redact(path),
                status
            );
        }
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<PayloadStream>> {
        let url = parse_location(path)?;
        let failed = |e| Self::failed(Operation::Read, path, e);

        let mut connection = self.transport.open(&url, Request::Get).map_err(failed)?;
        let status = connection.status().map_err(failed)?;

        if status == HTTP_OK {
            tracing::debug!("Download completed with HTTP response code: {}", status);
            return Ok(Some(Box::new(connection)));
        }

        drop(connection);
        tracing::info!("No file to download. Response code: {}", status);
        Ok(None)
    }
}

impl<T: Transport> ExternalPayloadStorage for PayloadStorage<T> {
    /// 位置由遠端協調端簽發，用戶端不產生
    fn get_location(
        &self,
        _operation: Operation,
        _payload_type: PayloadType,
    ) -> Result<ExternalStorageLocation> {
        Err(PayloadStorageError::Unsupported {
            capability: "get_location",
        })
    }

    fn upload(&self, path: &str, payload: &mut dyn Read, payload_size: u64) -> Result<()> {
        self.put(path, payload, payload_size).inspect_err(|e| {
            tracing::error!("{}", e);
        })
    }

    fn download(&self, path: &str) -> Result<Option<PayloadStream>> {
        self.get(path).inspect_err(|e| {
            tracing::error!("{}", e);
        })
    }
}
