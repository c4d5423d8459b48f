use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::service::{Completion, CompletionFailure, CompletionService};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, Message};

/// The public OpenAI endpoint.  Any server speaking the same protocol works.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: ReqwestClient,
    headers: HeaderMap,
    endpoint: Url,
    timeout: Duration,
    max_tokens: Option<u32>,
}

impl CompletionClient {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the `OPENAI_API_KEY`
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => api_key_from_env()?,
        };

        let endpoint = chat_completions_url(base_url.unwrap_or(DEFAULT_API_URL))?;
        let headers = default_headers(&api_key)?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            headers,
            endpoint,
            timeout,
            max_tokens: None,
        })
    }

    /// Cap the number of tokens generated per reply.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_status(status_code, &body, retry_after),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    /// Send a request and parse the response body.
    pub async fn send(&self, request: &ChatCompletionRequest<'_>) -> Result<ChatCompletionResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            tracing::warn!(error = %err, status = ?err.status_code(), "chat completion failed");
        }
        result
    }

    async fn send_inner(&self, request: &ChatCompletionRequest<'_>) -> Result<ChatCompletionResponse> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl CompletionService for CompletionClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
    ) -> std::result::Result<Completion, CompletionFailure> {
        let request = ChatCompletionRequest::new(model, messages).with_max_tokens(self.max_tokens);
        let response = self.send(&request).await?;
        let usage = response.usage_or_default();
        match response.first_text() {
            Some(text) => Ok(Completion::new(text, usage)),
            None => Err(CompletionFailure::with_usage(
                Error::empty_response("the service returned no choices"),
                usage,
            )),
        }
    }
}

/// Reads the API credential from the environment.
///
/// A missing or blank variable is a configuration error.
pub fn api_key_from_env() -> Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::config(format!(
            "Please set {API_KEY_ENV} environment variable"
        ))),
    }
}

fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| Error::config("API key contains characters not allowed in a header"))?;
    bearer.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, bearer);
    Ok(headers)
}

/// Resolves `chat/completions` against `base_url`.
///
/// A missing trailing slash is added so that `https://host/v1` keeps its path.
pub fn chat_completions_url(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("chat/completions")?)
}

/// Map an HTTP status and error body onto an [`Error`].
pub fn error_from_status(status_code: u16, body: &str, retry_after: Option<u64>) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(rename = "type")]
        error_type: Option<String>,
        message: Option<String>,
        param: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error);
    let error_type = detail.as_ref().and_then(|e| e.error_type.clone());
    let message = detail
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| body.to_string());
    let param = detail.and_then(|e| e.param);

    match status_code {
        400 => Error::bad_request(message, param),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, error_type, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining() {
        assert_eq!(
            chat_completions_url(DEFAULT_API_URL).unwrap().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_url("http://localhost:11434/v1").unwrap().as_str(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert!(chat_completions_url("not a url").unwrap_err().is_fatal());
    }

    #[test]
    fn status_mapping() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "bad model", "param": "model"}}"#;
        match error_from_status(400, body, None) {
            Error::BadRequest { message, param } => {
                assert_eq!(message, "bad model");
                assert_eq!(param.as_deref(), Some("model"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error_from_status(401, body, None).is_authentication());
        assert!(matches!(
            error_from_status(403, body, None),
            Error::Permission { .. }
        ));
        assert!(matches!(
            error_from_status(404, body, None),
            Error::NotFound { .. }
        ));
        assert!(error_from_status(408, body, None).is_timeout());
        assert!(error_from_status(500, body, None).is_server_error());
        assert!(error_from_status(503, body, None).is_server_error());
    }

    #[test]
    fn rate_limit_keeps_retry_after() {
        let body = r#"{"error": {"type": "insufficient_quota", "message": "quota"}}"#;
        match error_from_status(429, body, Some(20)) {
            Error::RateLimit {
                message,
                retry_after,
            } => {
                assert_eq!(message, "quota");
                assert_eq!(retry_after, Some(20));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_status_keeps_raw_body() {
        match error_from_status(418, "short and stout", None) {
            Error::Api {
                status_code,
                error_type,
                message,
            } => {
                assert_eq!(status_code, 418);
                assert_eq!(error_type, None);
                assert_eq!(message, "short and stout");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_header_is_config_error() {
        let err = CompletionClient::new(Some("line\nbreak".to_string())).unwrap_err();
        assert!(err.is_fatal());
    }
}
