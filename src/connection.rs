//! Low-level HTTP exchange with the hub

use crate::config::HubConfig;
use crate::error::{PowerViewError, Result};
use std::future::Future;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Content type the hub expects on request bodies
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// HTTP methods the hub API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
        }
    }
}

/// One outgoing request, independent of how it is carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,

    /// Send a bare `?` after the path when there is no query.
    ///
    /// Listing endpoints hang on some hub firmware unless the request target
    /// ends in `?`, so this must reach the wire untouched.
    pub preserve_empty_query: bool,

    /// JSON body, sent with [`JSON_CONTENT_TYPE`]
    pub body: Option<String>,
}

impl HubRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: None,
            preserve_empty_query: false,
            body: None,
        }
    }

    /// GET for a listing endpoint, target ends in `?`
    pub fn listing(path: impl Into<String>) -> Self {
        Self {
            preserve_empty_query: true,
            ..Self::get(path)
        }
    }

    pub fn put_json(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            query: None,
            preserve_empty_query: false,
            body: Some(body.into()),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Exact request target written on the request line
    pub fn target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None if self.preserve_empty_query => format!("{}?", self.path),
            None => self.path.clone(),
        }
    }
}

/// Status and fully drained body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Status line text, e.g. `404 Not Found`
    pub fn status_text(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

/// Carries a [`HubRequest`] to the hub and returns its raw response
///
/// Implementations must not retry and must release any connection before the
/// returned future completes. Deadlines are applied by the caller.
pub trait Transport {
    fn send(&self, request: &HubRequest) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// HTTP/1.1 over one fresh TCP connection per request
#[derive(Debug, Clone)]
pub struct HttpTransport {
    socket_address: String,
    host: String,
}

impl HttpTransport {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            socket_address: config.socket_address(),
            host: config.address.clone(),
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HubRequest) -> impl Future<Output = Result<RawResponse>> + Send {
        let socket_address = self.socket_address.clone();
        let bytes = encode_request(&self.host, request);

        async move {
            let mut stream = TcpStream::connect(&socket_address).await.map_err(|e| {
                tracing::debug!("Failed to connect to {}: {}", socket_address, e);
                PowerViewError::Io(e)
            })?;

            stream.write_all(&bytes).await?;
            stream.flush().await?;

            // The stream is dropped (and the socket closed) on every return path.
            read_response(&mut stream).await
        }
    }
}

fn encode_request(host: &str, request: &HubRequest) -> Vec<u8> {
    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nAccept: application/json\r\nConnection: close\r\n",
        request.method.as_str(),
        request.target(),
        host
    );
    if let Some(body) = &request.body {
        head.push_str(&format!(
            "Content-Type: {}\r\nContent-Length: {}\r\n",
            JSON_CONTENT_TYPE,
            body.len()
        ));
    }
    head.push_str("\r\n");

    let mut bytes = head.into_bytes();
    if let Some(body) = &request.body {
        bytes.extend_from_slice(body.as_bytes());
    }
    bytes
}

/// Largest response body accepted from the hub
const MAX_BODY_BYTES: usize = 1 << 20;

/// Largest header block accepted before the blank line
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Longest chunk-size line (size plus extensions)
const MAX_CHUNK_LINE: usize = 256;

#[derive(Debug, PartialEq, Eq)]
enum Framing {
    Length(usize),
    Chunked,
    UntilClose,
}

#[derive(Debug)]
struct ResponseHead {
    status: u16,
    reason: String,
    framing: Framing,
}

fn body_too_large() -> PowerViewError {
    PowerViewError::Protocol(format!("response body exceeds {MAX_BODY_BYTES} bytes"))
}

async fn read_response<S: AsyncRead + Unpin>(stream: &mut S) -> Result<RawResponse> {
    let mut buf: Vec<u8> = Vec::with_capacity(4096);

    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(PowerViewError::Protocol("response headers too large".to_string()));
        }
        if stream.read_buf(&mut buf).await? == 0 {
            return Err(PowerViewError::Protocol(
                "connection closed before response headers".to_string(),
            ));
        }
    };

    let head = parse_head(&buf[..header_end])?;
    let mut body = buf.split_off(header_end);

    match head.framing {
        Framing::Length(len) => {
            if len > MAX_BODY_BYTES {
                return Err(body_too_large());
            }
            while body.len() < len {
                if stream.read_buf(&mut body).await? == 0 {
                    return Err(PowerViewError::Protocol(format!(
                        "body truncated at {} of {} bytes",
                        body.len(),
                        len
                    )));
                }
            }
            body.truncate(len);
        }
        Framing::Chunked => {
            let mut decoder = ChunkedDecoder::default();
            while !decoder.feed(&body)? {
                if stream.read_buf(&mut body).await? == 0 {
                    return Err(PowerViewError::Protocol("chunked body truncated".to_string()));
                }
            }
            body = decoder.out;
        }
        Framing::UntilClose => {
            (&mut *stream)
                .take(MAX_BODY_BYTES as u64 + 1)
                .read_to_end(&mut body)
                .await?;
            if body.len() > MAX_BODY_BYTES {
                return Err(body_too_large());
            }
        }
    }

    tracing::debug!("Received: {} {} ({} bytes)", head.status, head.reason, body.len());

    Ok(RawResponse {
        status: head.status,
        reason: head.reason,
        body,
    })
}

fn parse_head(raw: &[u8]) -> Result<ResponseHead> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| PowerViewError::Protocol("response headers are not UTF-8".to_string()))?;
    let mut lines = text.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(PowerViewError::Protocol(format!("bad status line {status_line:?}")));
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| PowerViewError::Protocol(format!("bad status line {status_line:?}")))?;
    let reason = parts.next().unwrap_or_default().trim().to_string();

    let mut framing = Framing::UntilClose;
    for line in lines.filter(|l| !l.is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            return Err(PowerViewError::Protocol(format!("bad header line {line:?}")));
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("transfer-encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            framing = Framing::Chunked;
        } else if name.eq_ignore_ascii_case("content-length") && framing != Framing::Chunked {
            let len = value
                .parse::<usize>()
                .map_err(|_| PowerViewError::Protocol(format!("bad content-length {value:?}")))?;
            framing = Framing::Length(len);
        }
    }

    Ok(ResponseHead {
        status,
        reason,
        framing,
    })
}

/// Incremental `Transfer-Encoding: chunked` decoder
///
/// `pos` is the first byte of the raw body not yet consumed, so each call only
/// looks at what arrived since the last complete chunk.
#[derive(Debug, Default)]
struct ChunkedDecoder {
    pos: usize,
    out: Vec<u8>,
}

impl ChunkedDecoder {
    /// Consume complete chunks from `data`; true once the zero-size chunk is seen.
    fn feed(&mut self, data: &[u8]) -> Result<bool> {
        loop {
            let pending = &data[self.pos..];
            let Some(line_len) = find(pending, b"\r\n") else {
                if pending.len() > MAX_CHUNK_LINE {
                    return Err(PowerViewError::Protocol("chunk header too long".to_string()));
                }
                return Ok(false);
            };
            let line = std::str::from_utf8(&pending[..line_len])
                .map_err(|_| PowerViewError::Protocol("bad chunk header".to_string()))?;
            let size_field = line.split(';').next().unwrap_or_default().trim();
            let size = usize::from_str_radix(size_field, 16)
                .map_err(|_| PowerViewError::Protocol(format!("bad chunk size {size_field:?}")))?;

            if size == 0 {
                return Ok(true);
            }
            if size > MAX_BODY_BYTES - self.out.len() {
                return Err(body_too_large());
            }

            let start = self.pos + line_len + 2;
            let end = start
                .checked_add(size)
                .and_then(|n| n.checked_add(2))
                .ok_or_else(|| PowerViewError::Protocol("chunk size overflow".to_string()))?;
            if data.len() < end {
                return Ok(false);
            }
            if &data[end - 2..end] != b"\r\n" {
                return Err(PowerViewError::Protocol("chunk not followed by CRLF".to_string()));
            }
            self.out.extend_from_slice(&data[start..end - 2]);
            self.pos = end;
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every request and answers from a queue of canned responses
    #[derive(Debug, Default)]
    pub(crate) struct RecordingTransport {
        responses: Mutex<VecDeque<RawResponse>>,
        requests: Mutex<Vec<HubRequest>>,
    }

    impl RecordingTransport {
        pub(crate) fn with_responses(responses: impl IntoIterator<Item = RawResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn json(body: &str) -> Self {
            Self::with_responses([RawResponse::ok(body)])
        }

        pub(crate) fn requests(&self) -> Vec<HubRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: &HubRequest) -> impl Future<Output = Result<RawResponse>> + Send {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.responses.lock().unwrap().pop_front();
            async move {
                next.ok_or_else(|| {
                    PowerViewError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "no canned response left",
                    ))
                })
            }
        }
    }
}
