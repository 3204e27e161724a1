//! Monoio-native HTTPS client
//!
//! - Single-threaded async with monoio
//! - Direct TLS integration with rustls
//! - HTTP/1.1 with `Connection: close`, one connection per request
//! - Chunked transfer-encoding decoding
//! - Per-request timeout on the monoio timer

use crate::errors::{ExchangeError, Result};
use bitbot_core::PerfTimer;
use monoio::io::{AsyncReadRent, AsyncWriteRentExt};
use monoio::net::TcpStream;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};
use serde_json::Value;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Longest body excerpt carried in an `HttpError`
const ERROR_BODY_LIMIT: usize = 1000;

/// HTTPS client shared by every venue client
pub struct HttpsClient {
    tls_config: Arc<ClientConfig>,
    timeout: Duration,
}

/// HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// TLS stream wrapper for monoio
struct TlsStream {
    stream: TcpStream,
    tls_conn: ClientConnection,
    write_buf: Vec<u8>,
    handshake_complete: bool,
}

impl HttpsClient {
    /// Create a new HTTPS client trusting the webpki root set
    pub fn new(timeout: Duration) -> Self {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let tls_config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            tls_config: Arc::new(tls_config),
            timeout,
        }
    }

    /// Perform a request and decode a JSON body
    ///
    /// Any status other than 200/201 becomes `HttpError` carrying the first
    /// 1000 bytes of the body.
    pub async fn request_json(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<Value> {
        let response = self.request(method, url, headers, body).await?;

        if response.status != 200 && response.status != 201 {
            return Err(ExchangeError::HttpError(
                response.status,
                truncate(&response.body, ERROR_BODY_LIMIT).to_string(),
            ));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            ExchangeError::SerializationError(format!("{e}: {}", truncate(&response.body, ERROR_BODY_LIMIT)))
        })
    }

    /// Perform a request within the client timeout
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<HttpResponse> {
        let _timer = PerfTimer::start(format!("{method} {url}"));
        monoio::time::timeout(self.timeout, self.send(method, url, headers, body))
            .await
            .map_err(|_| ExchangeError::Timeout(format!("{method} {url} after {:?}", self.timeout)))?
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<HttpResponse> {
        let parsed_url = url::Url::parse(url)?;

        let host = parsed_url
            .host_str()
            .ok_or_else(|| ExchangeError::InvalidUrl(format!("no host in {url}")))?;
        let port = parsed_url.port().unwrap_or(443);
        let mut path_and_query = parsed_url.path().to_string();
        if path_and_query.is_empty() {
            path_and_query.push('/');
        }
        if let Some(query) = parsed_url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let tcp_stream = TcpStream::connect(format!("{host}:{port}"))
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("TCP connect to {host} failed: {e}")))?;

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ExchangeError::NetworkError(format!("Invalid server name {host}: {e:?}")))?;
        let tls_conn = ClientConnection::new(self.tls_config.clone(), server_name)
            .map_err(|e| ExchangeError::NetworkError(format!("TLS setup failed: {e}")))?;
        let mut tls_stream = TlsStream::new(tcp_stream, tls_conn);

        let request = build_request(method, host, &path_and_query, headers, body);
        debug!("📡 {} {}", method, parsed_url);

        tls_stream.write_all(request.as_bytes()).await?;
        let response_data = tls_stream.read_to_end().await?;

        parse_http_response(&response_data)
    }
}

fn build_request(method: &str, host: &str, path_and_query: &str, headers: &[(&str, &str)], body: Option<&str>) -> String {
    let content_length = body.map(str::len).unwrap_or(0);
    let mut request = format!(
        "{method} {path_and_query} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: bitbot/0.1\r\n\
         Accept: application/json\r\n\
         Connection: close\r\n\
         Content-Length: {content_length}\r\n"
    );

    for (key, value) in headers {
        request.push_str(&format!("{key}: {value}\r\n"));
    }

    request.push_str("\r\n");
    if let Some(body) = body {
        request.push_str(body);
    }
    request
}

fn truncate(body: &str, limit: usize) -> &str {
    if body.len() <= limit {
        return body;
    }
    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Split a raw HTTP/1.1 response into status, headers and decoded body
fn parse_http_response(data: &[u8]) -> Result<HttpResponse> {
    let header_end = data
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or_else(|| ExchangeError::NetworkError("Invalid HTTP response: no header terminator".to_string()))?;

    let header_part = String::from_utf8_lossy(&data[..header_end]);
    let raw_body = &data[header_end + 4..];

    let mut lines = header_part.lines();
    let status_line = lines
        .next()
        .ok_or_else(|| ExchangeError::NetworkError("Empty response".to_string()))?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ExchangeError::NetworkError(format!("Invalid status line: {status_line}")))?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let chunked = headers.iter().any(|(key, value)| {
        key.eq_ignore_ascii_case("transfer-encoding") && value.to_ascii_lowercase().contains("chunked")
    });
    let body = if chunked {
        decode_chunked(raw_body)?
    } else {
        raw_body.to_vec()
    };

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn decode_chunked(mut data: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(data.len());
    loop {
        let line_end = data
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or_else(|| ExchangeError::NetworkError("Truncated chunk size line".to_string()))?;
        let size_line = String::from_utf8_lossy(&data[..line_end]);
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| ExchangeError::NetworkError(format!("Invalid chunk size `{size_hex}`")))?;
        data = &data[line_end + 2..];

        if size == 0 {
            return Ok(body);
        }
        if data.len() < size {
            return Err(ExchangeError::NetworkError("Truncated chunk".to_string()));
        }
        body.extend_from_slice(&data[..size]);
        data = data.get(size + 2..).unwrap_or(&[]);
    }
}

impl TlsStream {
    fn new(stream: TcpStream, tls_conn: ClientConnection) -> Self {
        Self {
            stream,
            tls_conn,
            write_buf: Vec::with_capacity(8192),
            handshake_complete: false,
        }
    }

    async fn flush_tls(&mut self) -> Result<()> {
        while self.tls_conn.wants_write() {
            self.write_buf.clear();
            let tls_bytes = self
                .tls_conn
                .write_tls(&mut self.write_buf)
                .map_err(|e| ExchangeError::NetworkError(format!("TLS write failed: {e}")))?;

            if tls_bytes > 0 {
                let (result, _) = self.stream.write_all(self.write_buf.clone()).await;
                result.map_err(|e| ExchangeError::NetworkError(format!("TCP write failed: {e}")))?;
            }
        }
        Ok(())
    }

    /// Feed one TCP read into the TLS session, returns false on EOF
    async fn fill_tls(&mut self) -> Result<bool> {
        let buffer = vec![0u8; 4096];
        let (result, buf) = self.stream.read(buffer).await;
        let bytes_read = result.map_err(|e| ExchangeError::NetworkError(format!("TCP read failed: {e}")))?;
        if bytes_read == 0 {
            return Ok(false);
        }

        self.tls_conn
            .read_tls(&mut std::io::Cursor::new(&buf[..bytes_read]))
            .map_err(|e| ExchangeError::NetworkError(format!("TLS read failed: {e}")))?;
        self.tls_conn
            .process_new_packets()
            .map_err(|e| ExchangeError::NetworkError(format!("TLS process failed: {e}")))?;
        Ok(true)
    }

    async fn complete_handshake(&mut self) -> Result<()> {
        while !self.handshake_complete {
            self.flush_tls().await?;

            if !self.tls_conn.is_handshaking() {
                self.handshake_complete = true;
                break;
            }

            if !self.tls_conn.wants_read() {
                return Err(ExchangeError::NetworkError("TLS handshake stalled".to_string()));
            }
            if !self.fill_tls().await? {
                return Err(ExchangeError::NetworkError("Connection closed during handshake".to_string()));
            }
        }
        Ok(())
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.complete_handshake().await?;

        self.tls_conn
            .writer()
            .write_all(data)
            .map_err(|e| ExchangeError::NetworkError(format!("TLS application write failed: {e}")))?;

        self.flush_tls().await
    }

    async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        self.complete_handshake().await?;

        let mut response_data = Vec::new();
        let mut plain = vec![0u8; 4096];

        loop {
            match self.tls_conn.reader().read(&mut plain) {
                Ok(0) => break,
                Ok(n) => {
                    response_data.extend_from_slice(&plain[..n]);
                    continue;
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                // Peers that drop the socket without close_notify still sent a full response.
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(ExchangeError::NetworkError(format!("TLS read failed: {e}"))),
            }

            if !self.fill_tls().await? {
                break;
            }
        }

        Ok(response_data)
    }
}

impl Default for HttpsClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
