//! HTTP posting abstraction.
//!
//! [`HttpPoster`] is transport-agnostic; [`ReqwestPoster`] implements it via reqwest.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// Default request timeout for [`ReqwestPoster`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ordered `application/x-www-form-urlencoded` fields. Encoding is the poster's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResponse {
    pub status: u16,
    pub body: String,
}

impl PostResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one form POST and returns the status and body. Implementations must not retry.
#[async_trait]
pub trait HttpPoster: Send + Sync {
    /// Posts `form` to `url`. Any response with a status line is `Ok`, whatever the status.
    async fn post(&self, url: &str, form: &FormBody) -> Result<PostResponse, TransportError>;
}

#[async_trait]
impl<'a, P: HttpPoster + ?Sized> HttpPoster for &'a P {
    async fn post(&self, url: &str, form: &FormBody) -> Result<PostResponse, TransportError> {
        (**self).post(url, form).await
    }
}

/// reqwest-based implementation of [`HttpPoster`].
#[derive(Debug, Clone)]
pub struct ReqwestPoster {
    client: reqwest::Client,
}

impl ReqwestPoster {
    /// Poster with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Poster whose requests abort with [`TransportError::Timeout`] after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(describe(&e.without_url())))?;
        Ok(Self { client })
    }

    /// Wraps an existing client (timeout and TLS settings are the caller's).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpPoster for ReqwestPoster {
    async fn post(&self, url: &str, form: &FormBody) -> Result<PostResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .form(form.fields())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(PostResponse { status, body })
    }
}

/// Maps a reqwest error to [`TransportError`]. The URL is stripped since it carries the token.
fn classify(err: reqwest::Error) -> TransportError {
    let err = err.without_url();
    let message = describe(&err);
    if err.is_timeout() {
        TransportError::Timeout(message)
    } else if err.is_connect() {
        TransportError::Connect(message)
    } else {
        TransportError::Other(message)
    }
}

/// Error message followed by its source chain.
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
