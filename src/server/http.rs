use std::collections::BTreeMap;
use std::fmt;
use std::io;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const MAX_HEAD_BYTES: usize = 16 * 1024;
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug)]
pub enum HttpError {
    Io(io::Error),
    ConnectionClosed,
    Malformed(String),
    HeadTooLarge,
    BodyTooLarge(usize),
}

impl From<io::Error> for HttpError {
    fn from(e: io::Error) -> Self {
        HttpError::Io(e)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Io(e) => write!(f, "IO error: {}", e),
            HttpError::ConnectionClosed => write!(f, "Connection closed"),
            HttpError::Malformed(msg) => write!(f, "Malformed request: {}", msg),
            HttpError::HeadTooLarge => write!(f, "Request headers too large"),
            HttpError::BodyTooLarge(len) => write!(f, "Request body too large: {} bytes", len),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    // None when nobody is left to answer
    pub fn status(&self) -> Option<HttpStatus> {
        match self {
            HttpError::Io(_) | HttpError::ConnectionClosed => None,
            HttpError::Malformed(_) => Some(HttpStatus::BAD_REQUEST),
            HttpError::HeadTooLarge => Some(HttpStatus::HEADERS_TOO_LARGE),
            HttpError::BodyTooLarge(_) => Some(HttpStatus::PAYLOAD_TOO_LARGE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatus(pub u16);

impl HttpStatus {
    pub const OK: Self = Self(200);
    pub const NO_CONTENT: Self = Self(204);
    pub const BAD_REQUEST: Self = Self(400);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const PAYLOAD_TOO_LARGE: Self = Self(413);
    pub const HEADERS_TOO_LARGE: Self = Self(431);
    pub const INTERNAL_ERROR: Self = Self(500);

    pub fn reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            413 => "Payload Too Large",
            431 => "Request Header Fields Too Large",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_ascii_lowercase())
    }

    fn content_length(&self) -> Result<usize, HttpError> {
        match self.get_header("content-length") {
            None => Ok(0),
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| HttpError::Malformed(format!("bad Content-Length {:?}", v))),
        }
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
pub fn parse_head(head: &str) -> Result<HttpRequest, HttpError> {
    let mut lines = head.split("\r\n");
    let request_line = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| HttpError::Malformed("empty request line".to_string()))?;

    let mut parts = request_line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::Malformed(format!("bad request line {:?}", request_line)));
    };

    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::Malformed(format!("unsupported version {}", version)));
    }
    let method = HttpMethod::parse(method)
        .ok_or_else(|| HttpError::Malformed(format!("unknown method {}", method)))?;

    // the API takes no query parameters
    let path = target.split_once('?').map_or(target, |(path, _)| path).to_string();

    let mut headers = BTreeMap::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::Malformed(format!("bad header {:?}", line)))?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(HttpRequest {
        method,
        path,
        headers,
        body: Vec::new(),
    })
}
pub async fn read_request<R>(reader: &mut R) -> Result<HttpRequest, HttpError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(end) = find_head_end(&buf) {
            break end;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(HttpError::HeadTooLarge);
        }
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Err(HttpError::ConnectionClosed);
            }
            return Err(HttpError::Malformed("truncated headers".to_string()));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if head_end > MAX_HEAD_BYTES {
        return Err(HttpError::HeadTooLarge);
    }

    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| HttpError::Malformed("headers are not UTF-8".to_string()))?;
    let mut request = parse_head(head)?;

    let length = request.content_length()?;
    if length > MAX_BODY_BYTES {
        return Err(HttpError::BodyTooLarge(length));
    }

    let mut body = buf.split_off(head_end + 4);
    body.truncate(length);
    if body.len() < length {
        let start = body.len();
        body.resize(length, 0);
        reader
            .read_exact(&mut body[start..])
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => HttpError::Malformed("truncated body".to_string()),
                _ => HttpError::Io(e),
            })?;
    }
    request.body = body;

    Ok(request)
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: HttpStatus) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn json<T: Serialize>(status: HttpStatus, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status)
                .header("Content-Type", "application/json")
                .body(body),
            Err(e) => Self::new(HttpStatus::INTERNAL_ERROR)
                .header("Content-Type", "text/plain")
                .body(e.to_string().into_bytes()),
        }
    }
    pub fn error(status: HttpStatus, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(128 + self.body.len());

        output.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status.0, self.status.reason()).as_bytes(),
        );
        for (name, value) in &self.headers {
            output.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        output.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        output.extend_from_slice(b"Connection: close\r\n\r\n");
        output.extend_from_slice(&self.body);

        output
    }
}
