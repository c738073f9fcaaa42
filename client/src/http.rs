//! HTTP transport for the detection service
//!
//! Each call is a single `POST` of the pre-encoded JSON body. Every failure
//! is classified into an [`Outcome`]; nothing is retried.

use std::error::Error as StdError;
use std::io::ErrorKind;

use async_trait::async_trait;
use detect_bench_core::{Outcome, RequestPayload, Transport};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use crate::config::{ConfigValidationError, TransportConfig};

/// Transport posting payloads to one detection endpoint.
///
/// The underlying reqwest client pools connections, so a single instance is
/// shared by every worker.
///
/// # Example
///
/// ```rust,ignore
/// let config = TransportConfig::new("http://localhost:8080/detect");
/// let transport = HttpTransport::new(&config)?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    config: TransportConfig,
}

impl HttpTransport {
    /// Create a transport from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, ConfigValidationError> {
        let endpoint = config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("detect-bench/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigValidationError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            config: config.clone(),
        })
    }

    /// Configuration used to create this transport.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn send(&self, payload: RequestPayload) -> Outcome {
        let id = payload.id;

        let response = match self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify(&e),
        };

        let status = response.status();
        let outcome = match response.text().await {
            Ok(body) if status.is_success() => Outcome::Success { body },
            Ok(body) => Outcome::ServiceError {
                status: status.as_u16(),
                body,
            },
            Err(e) => classify(&e),
        };

        tracing::debug!(id = %id, status = status.as_u16(), "Response received");
        outcome
    }
}

/// Map a reqwest failure onto an outcome
///
/// Connect failures are checked first so a connect timeout stays a
/// connection problem. Anything that broke the exchange after the
/// connection was up (peer hung up mid-request, reset, truncated body) is
/// also a connection problem.
fn classify(err: &reqwest::Error) -> Outcome {
    let cause = error_chain(err);
    if err.is_connect() {
        Outcome::ConnectionError { cause }
    } else if err.is_timeout() {
        Outcome::TimeoutError { cause }
    } else if err.is_request()
        || err.is_body()
        || err.is_decode()
        || is_dropped_connection(err)
    {
        Outcome::ConnectionError { cause }
    } else {
        Outcome::UnexpectedError { cause }
    }
}

/// Whether an io error somewhere in the chain says the peer went away
fn is_dropped_connection(err: &(dyn StdError + 'static)) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

/// Render an error with its sources, `outer: inner: root`
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use detect_bench_core::{ItemId, OutcomeKind, RequestEncoder, WorkItem};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // ========================================================================
    // Stub server
    // ========================================================================

    /// Accept one connection, capture the raw request and answer with
    /// `status` and `body`. With `status == None` the connection is held open
    /// without a response.
    async fn serve_once(status: Option<u16>, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            match status {
                Some(code) => {
                    let response = format!(
                        "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        code,
                        body.len(),
                        body
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                }
                None => tokio::time::sleep(Duration::from_secs(5)).await,
            }

            request
        });

        (addr, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    fn transport_for(addr: SocketAddr, timeout: Duration) -> HttpTransport {
        let config = TransportConfig::new(format!("http://{}/detect", addr))
            .with_request_timeout(timeout)
            .with_connect_timeout(Duration::from_secs(1));
        HttpTransport::new(&config).unwrap()
    }

    fn payload() -> RequestPayload {
        RequestEncoder::default()
            .encode_bytes(&WorkItem::new("/data/cat.jpg"), b"\xff\xd8\xff")
            .unwrap()
    }

    // ========================================================================
    // Tests
    // ========================================================================

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = HttpTransport::new(&TransportConfig::new("localhost:8080")).unwrap_err();
        assert!(matches!(err, ConfigValidationError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_success_response() {
        let (addr, server) = serve_once(Some(200), r#"{"id": "x", "object": []}"#).await;
        let transport = transport_for(addr, Duration::from_secs(5));

        let outcome = transport.send(payload()).await;

        match outcome {
            Outcome::Success { body } => assert_eq!(body, r#"{"id": "x", "object": []}"#),
            other => panic!("expected success, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_request_wire_format() {
        let (addr, server) = serve_once(Some(200), "{}").await;
        let transport = transport_for(addr, Duration::from_secs(5));

        let payload = payload();
        let id: ItemId = payload.id;
        transport.send(payload).await;

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();

        assert!(head.starts_with("POST /detect HTTP/1.1"));
        assert!(head
            .to_ascii_lowercase()
            .contains("content-type: application/json"));

        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["image"], "/9j/");
        assert_eq!(json["id"], id.to_string());
    }

    #[tokio::test]
    async fn test_service_error_response() {
        let (addr, server) = serve_once(Some(500), r#"{"error": "model not loaded"}"#).await;
        let transport = transport_for(addr, Duration::from_secs(5));

        let outcome = transport.send(payload()).await;

        assert_eq!(outcome.kind(), OutcomeKind::ServiceError);
        assert_eq!(outcome.status(), Some(500));
        if let Outcome::ServiceError { body, .. } = outcome {
            assert!(body.contains("model not loaded"));
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout_classification() {
        let (addr, _server) = serve_once(None, "").await;
        let transport = transport_for(addr, Duration::from_millis(200));

        let outcome = transport.send(payload()).await;

        assert_eq!(outcome.kind(), OutcomeKind::TimeoutError);
    }

    #[tokio::test]
    async fn test_connection_refused_classification() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = transport_for(addr, Duration::from_secs(5));
        let outcome = transport.send(payload()).await;

        assert_eq!(outcome.kind(), OutcomeKind::ConnectionError);
    }

    #[tokio::test]
    async fn test_peer_hangup_before_response_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            drop(socket);
        });

        let transport = transport_for(addr, Duration::from_secs(5));
        let outcome = transport.send(payload()).await;

        assert_eq!(outcome.kind(), OutcomeKind::ConnectionError, "{:?}", outcome);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_truncated_body_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let partial = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"object\"";
            socket.write_all(partial.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let transport = transport_for(addr, Duration::from_secs(5));
        let outcome = transport.send(payload()).await;

        assert_eq!(outcome.kind(), OutcomeKind::ConnectionError, "{:?}", outcome);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_timeout_is_connection_error() {
        // Non-routable address: the SYN is never answered
        let config = TransportConfig::new("http://10.255.255.1/detect")
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_millis(200));
        let transport = HttpTransport::new(&config).unwrap();

        let outcome = transport.send(payload()).await;

        assert_eq!(outcome.kind(), OutcomeKind::ConnectionError, "{:?}", outcome);
    }

    #[test]
    fn test_dropped_connection_detection() {
        let reset = std::io::Error::new(ErrorKind::ConnectionReset, "reset by peer");
        let refused = std::io::Error::new(ErrorKind::ConnectionRefused, "refused");

        assert!(is_dropped_connection(&reset));
        assert!(!is_dropped_connection(&refused));
    }

    #[test]
    fn test_endpoint_and_name() {
        let config = TransportConfig::new("http://127.0.0.1:9000/detect");
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(transport.name(), "http");
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9000/detect");
        assert_eq!(transport.config().request_timeout, Duration::from_secs(60));
    }
}
