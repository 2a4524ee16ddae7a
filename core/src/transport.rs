//! The one place that touches the network.
//!
//! # Design
//! `Transport` executes a single `HttpRequest` and hands back whatever the
//! server answered, status included. It never interprets status codes; that
//! is the client's job. One attempt per call, no retries, no timeout beyond
//! the agent's defaults.

use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a ureq agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx come back as data so the client can classify them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        debug!(method = %request.method, url = %loggable_url(url), "sending request");

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), headers).send(body)
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
        };
        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::TransportFailure(format!("reading body: {e}")))?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// The URL without its query string. Login and registration carry the
/// password in the query.
fn loggable_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn classify(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::BadUri(uri) => ApiError::InvalidRequest(format!("bad uri: {uri}")),
        ureq::Error::Http(e) => ApiError::InvalidRequest(e.to_string()),
        ureq::Error::Protocol(e) => ApiError::InvalidResponse(e.to_string()),
        other => ApiError::TransportFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::client::FoodLogClient;
    use crate::types::Credentials;

    #[test]
    fn unreachable_host_is_a_transport_failure() {
        // Port 9 on loopback (discard) is closed in test environments.
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/api/users/user/1".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = UreqTransport::new().execute(&request).unwrap_err();
        assert!(matches!(err, ApiError::TransportFailure(_)), "{err:?}");
    }

    #[test]
    fn logged_url_drops_the_query() {
        assert_eq!(
            loggable_url("http://localhost:8000/api/users/login?username_or_email=ann&password=pw"),
            "http://localhost:8000/api/users/login"
        );
        assert_eq!(loggable_url("http://exa mple.com/?password=pw"), "<unparseable url>");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn debug_log_never_contains_the_password() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let credentials = Credentials {
            username_or_email: "ann".to_string(),
            password: "hunter2secret".to_string(),
        };
        let request = FoodLogClient::new("http://127.0.0.1:9")
            .build_login(&credentials)
            .unwrap();
        tracing::subscriber::with_default(subscriber, || {
            let _ = UreqTransport::new().execute(&request);
        });

        let log = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(log.contains("sending request"), "{log}");
        assert!(log.contains("/api/users/login"), "{log}");
        assert!(!log.contains("hunter2secret"), "{log}");
    }

    #[test]
    fn malformed_url_is_an_invalid_request() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://exa mple.com/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = UreqTransport::new().execute(&request).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)), "{err:?}");
    }
}
