use crate::config::TransportConfig;
use crate::domain::model::{Method, Request};
use crate::domain::ports::{Connection, Transport};
use crate::utils::error::{redact, PayloadStorageError, Result};
use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use std::io::{self, Read, Write};
use std::mem;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use url::Url;

/// 以 reqwest blocking client 實作的 HTTP 傳輸
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    pipe_depth: usize,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        // 不保留閒置連線，每次呼叫都是獨立的連線
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| PayloadStorageError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            pipe_depth: config.pipe_depth.max(1),
        })
    }
}

impl Transport for HttpTransport {
    type Connection = HttpConnection;

    fn open(&self, url: &Url, request: Request) -> io::Result<HttpConnection> {
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
        };
        let builder = self.client.request(method, url.clone());

        let state = match request {
            Request::Get => State::Pending(builder),
            Request::Put { content_length } => {
                let (body, chunks) = mpsc::sync_channel(self.pipe_depth);
                let builder =
                    builder.body(Body::sized(ChunkReader::new(chunks), content_length));
                let exchange = thread::Builder::new()
                    .name("payload-upload".to_string())
                    .spawn(move || builder.send())?;
                State::Sending { body, exchange }
            }
        };

        tracing::debug!(
            "Opened {:?} connection to {}",
            request.method(),
            redact(url.as_str())
        );
        Ok(HttpConnection { state })
    }
}

enum State {
    /// GET 尚未送出
    Pending(RequestBuilder),
    /// PUT 正在傳送執行緒上進行，body 區塊經由 channel 送過去
    Sending {
        body: SyncSender<Vec<u8>>,
        exchange: JoinHandle<reqwest::Result<Response>>,
    },
    Responded(Response),
    Closed,
}

pub struct HttpConnection {
    state: State,
}

fn join_exchange(exchange: JoinHandle<reqwest::Result<Response>>) -> io::Result<Response> {
    exchange
        .join()
        .map_err(|_| io::Error::other("upload exchange thread panicked"))?
        .map_err(io::Error::other)
}

impl Connection for HttpConnection {
    fn status(&mut self) -> io::Result<u16> {
        let response = match mem::replace(&mut self.state, State::Closed) {
            State::Pending(builder) => builder.send().map_err(io::Error::other)?,
            State::Sending { body, exchange } => {
                // 關閉 channel，body reader 才會讀到 EOF
                drop(body);
                join_exchange(exchange)?
            }
            State::Responded(response) => response,
            State::Closed => {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "connection already closed",
                ))
            }
        };

        let status = response.status().as_u16();
        self.state = State::Responded(response);
        Ok(status)
    }
}

impl Write for HttpConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let State::Sending { body, .. } = &self.state else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "request body is not writable",
            ));
        };
        if buf.is_empty() {
            return Ok(0);
        }

        if body.send(buf.to_vec()).is_err() {
            // 傳送執行緒已結束：回報它的錯誤，否則就是遠端提早回應
            self.status()?;
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "remote responded before the request body was sent",
            ));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for HttpConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.state {
            State::Responded(response) => response.read(buf),
            _ => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "response is not available",
            )),
        }
    }
}

impl Drop for HttpConnection {
    fn drop(&mut self) {
        if let State::Sending { body, exchange } = mem::replace(&mut self.state, State::Closed) {
            drop(body);
            // body 提早結束時 reqwest 會中止請求，join 只等待連線真正關閉
            let _ = exchange.join();
        }
    }
}

/// 將 channel 收到的區塊串成 reqwest 需要的 `Read`
struct ChunkReader {
    chunks: Receiver<Vec<u8>>,
    current: Vec<u8>,
    offset: usize,
}

impl ChunkReader {
    fn new(chunks: Receiver<Vec<u8>>) -> Self {
        Self {
            chunks,
            current: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset >= self.current.len() {
            match self.chunks.recv() {
                Ok(chunk) => {
                    self.current = chunk;
                    self.offset = 0;
                }
                // sender 已關閉
                Err(_) => return Ok(0),
            }
        }

        let n = buf.len().min(self.current.len() - self.offset);
        buf[..n].copy_from_slice(&self.current[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}
