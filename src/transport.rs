//!
//! This module defines the request function the client is built on, and its HTTP implementation.
//!
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// One call against the admin API.
///
/// The path is held as raw segments; transports percent-encode each segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post(segments: &[&str], body: Value) -> Self {
        Self::new(Method::POST, segments).with_body(body)
    }

    pub fn put(segments: &[&str], body: Value) -> Self {
        Self::new(Method::PUT, segments).with_body(body)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `/`-joined path, unencoded. Used for logging.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Issues requests and yields the decoded payload.
///
/// Retry policy, if any, belongs to implementations; the client never retries.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request(&self, request: Request) -> Result<Value, ClientError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Build a transport for `config.base_url`.
    ///
    /// # Errors
    /// Raise ClientError::BadAddress if the base URL cannot carry path segments.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_e| ClientError::BadAddress(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BadAddress(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self, request: &Request) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_e| ClientError::BadAddress(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(request.segments.iter());
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn request(&self, request: Request) -> Result<Value, ClientError> {
        let url = self.url(&request)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(api_key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;
        let result = decode_response(status, body);
        if let Err(e) = &result {
            tracing::warn!("{} {} failed: {}", request.method, request.path(), e);
        }
        result
    }
}

fn classify(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(e)
    }
}

/// Turn a raw HTTP response into a payload or a backend error.
///
/// Successful responses: an empty body decodes to null, JSON decodes as such and other text is kept as a string.
/// Failed responses carry the backend's `message`, `error` or `detail` field, else the body text, else the status reason.
pub fn decode_response(status: StatusCode, body: Bytes) -> Result<Value, ClientError> {
    if status.is_success() {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        return match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Ok(value),
            Err(_e) => match std::str::from_utf8(&body) {
                Ok(text) => Ok(Value::String(text.to_owned())),
                Err(_e) => Err(ClientError::InvalidBody(format!(
                    "{} bytes of non UTF-8 data",
                    body.len()
                ))),
            },
        };
    }

    let message = serde_json::from_slice::<Value>(&body)
        .ok()
        .as_ref()
        .and_then(backend_message)
        .or_else(|| {
            let text = String::from_utf8_lossy(&body).trim().to_owned();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .or_else(|| status.canonical_reason().map(str::to_owned));

    Err(ClientError::Backend { status, message })
}

fn backend_message(payload: &Value) -> Option<String> {
    let record = payload.as_object()?;
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(_) => backend_message(value),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport(base_url: &str) -> Result<HttpTransport, ClientError> {
        HttpTransport::new(&ClientConfig {
            base_url: base_url.to_owned(),
            ..Default::default()
        })
    }

    #[test]
    fn test_bad_address() {
        assert!(matches!(transport("not a url"), Err(ClientError::BadAddress(_))));
        assert!(matches!(transport("mailto:ops@example.com"), Err(ClientError::BadAddress(_))));
    }

    #[test]
    fn test_url_encodes_segments() -> Result<(), ClientError> {
        let transport = transport("http://localhost:5000/api/")?;
        let request = Request::get(&["queues", "orders eu/1", "messages"])
            .with_query("limit", 10)
            .with_query("offset", 20);
        let url = transport.url(&request)?;
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/queues/orders%20eu%2F1/messages?limit=10&offset=20"
        );
        Ok(())
    }

    #[test]
    fn test_url_without_base_path() -> Result<(), ClientError> {
        let transport = transport("http://localhost:5000")?;
        let url = transport.url(&Request::get(&["topics"]))?;
        assert_eq!(url.as_str(), "http://localhost:5000/topics");
        Ok(())
    }

    #[test]
    fn test_request_path() {
        let request = Request::delete(&["topics", "t1"]);
        assert_eq!(request.path(), "/topics/t1");
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_decode_success() -> Result<(), ClientError> {
        assert_eq!(decode_response(StatusCode::NO_CONTENT, Bytes::new())?, Value::Null);
        assert_eq!(
            decode_response(StatusCode::OK, Bytes::from(r#"{"queues":[]}"#))?,
            json!({"queues": []})
        );
        assert_eq!(
            decode_response(StatusCode::OK, Bytes::from("deleted"))?,
            json!("deleted")
        );
        Ok(())
    }

    #[test]
    fn test_decode_backend_message() {
        let err = decode_response(
            StatusCode::CONFLICT,
            Bytes::from(r#"{"error":{"message":"Queue already exists"}}"#),
        )
        .unwrap_err();
        assert_eq!(err.display_message(), "Queue already exists");
    }

    #[test]
    fn test_decode_backend_text_and_reason() {
        let err = decode_response(StatusCode::BAD_GATEWAY, Bytes::from("upstream down")).unwrap_err();
        assert_eq!(err.display_message(), "upstream down");

        let err = decode_response(StatusCode::NOT_FOUND, Bytes::new()).unwrap_err();
        assert_eq!(err.display_message(), "Not Found");
    }
}
