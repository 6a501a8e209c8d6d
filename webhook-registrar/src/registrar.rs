//! setWebhook request composition and outcome classification.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;
use webhook_core::{BaseHost, BotCredential};

use crate::error::{RegistrarError, Result};
use crate::poster::{FormBody, HttpPoster, PostResponse};

/// Telegram Bot API origin.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
/// Path prefix under the base host where updates are delivered.
pub const WEBHOOK_PATH: &str = "/webhook/";

const HTTPS_PREFIX: &str = "https://";

/// Everything outside RFC 3986 unreserved characters and `:` is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':');

/// Classified outcome of a completed registration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResult {
    /// 2xx. The body's own `ok` flag is not inspected.
    Success { body: String },
    /// Non-2xx. `reason` is `http_status_<code>`.
    Failure { reason: String, body: String },
}

impl RegistrationResult {
    pub fn from_response(response: PostResponse) -> Self {
        if response.is_success() {
            Self::Success {
                body: response.body,
            }
        } else {
            Self::Failure {
                reason: format!("http_status_{}", response.status),
                body: response.body,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Success { body } | Self::Failure { body, .. } => body,
        }
    }
}

/// Checks that `base_host` is literally `https://host[:port]` with at most a trailing `/`.
/// Returns the origin without the trailing slash.
///
/// The raw text is checked before parsing: the URL parser normalizes forms such as
/// `https:host`, backslashes, tabs, dot segments and an uppercase scheme, and the raw text is
/// what ends up in the callback URL.
pub fn validate_base_host(base_host: &BaseHost) -> Result<&str> {
    let raw = base_host.as_str().trim();
    let invalid = |reason: &str| RegistrarError::InvalidBaseHost {
        base_host: base_host.as_str().to_string(),
        reason: reason.to_string(),
    };

    let authority = raw
        .strip_prefix(HTTPS_PREFIX)
        .ok_or_else(|| invalid("must start with https://"))?;
    let authority = authority.strip_suffix('/').unwrap_or(authority);
    if authority.is_empty() || authority.starts_with(':') {
        return Err(invalid("missing host"));
    }
    if authority.ends_with(':') {
        return Err(invalid("empty port"));
    }
    if !authority
        .bytes()
        .all(|b| b.is_ascii_graphic() && !b"/\\?#@%".contains(&b))
    {
        return Err(invalid("must be https://host[:port] with no path, query, fragment or credentials"));
    }

    let parsed = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(&raw[..HTTPS_PREFIX.len() + authority.len()])
}

fn encode_token(credential: &BotCredential) -> String {
    utf8_percent_encode(credential.expose(), PATH_SEGMENT).to_string()
}

fn compose_callback(origin: &str, token: &str) -> String {
    format!("{}{}{}", origin, WEBHOOK_PATH, token)
}

/// `<base_host>/webhook/<percent-encoded token>`.
pub fn callback_url(base_host: &BaseHost, credential: &BotCredential) -> Result<String> {
    let origin = validate_base_host(base_host)?;
    Ok(compose_callback(origin, &encode_token(credential)))
}

/// `<api_base>/bot<token>/setWebhook`. The token is inserted as-is, following the Bot API's URL shape.
pub fn registration_url(api_base: &str, credential: &BotCredential) -> String {
    format!(
        "{}/bot{}/setWebhook",
        api_base.trim_end_matches('/'),
        credential.expose()
    )
}

/// A composed setWebhook call. `Debug` and the `redacted_*` accessors hide the token.
#[derive(Clone)]
pub struct RegistrationRequest {
    url: String,
    form: FormBody,
    redacted_url: String,
    redacted_callback_url: String,
}

impl RegistrationRequest {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn form(&self) -> &FormBody {
        &self.form
    }

    pub fn callback_url(&self) -> &str {
        self.form.get("url").unwrap_or_default()
    }

    pub fn redacted_url(&self) -> &str {
        &self.redacted_url
    }

    pub fn redacted_callback_url(&self) -> &str {
        &self.redacted_callback_url
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("url", &self.redacted_url)
            .field("callback_url", &self.redacted_callback_url)
            .finish()
    }
}

/// Registers webhooks through an injected [`HttpPoster`].
pub struct WebhookRegistrar<P> {
    poster: P,
    api_base: String,
}

impl<P: HttpPoster> WebhookRegistrar<P> {
    /// Registrar targeting [`TELEGRAM_API_BASE`].
    pub fn new(poster: P) -> Self {
        Self {
            poster,
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// Points requests at another Bot API server (local Bot API server, mock server in tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn poster(&self) -> &P {
        &self.poster
    }

    /// Validates the base host and composes the request without sending it.
    pub fn prepare(
        &self,
        credential: &BotCredential,
        base_host: &BaseHost,
    ) -> Result<RegistrationRequest> {
        let origin = validate_base_host(base_host)?;
        let callback = compose_callback(origin, &encode_token(credential));
        let url = registration_url(&self.api_base, credential);

        Ok(RegistrationRequest {
            url,
            form: FormBody::new().field("url", callback),
            redacted_url: format!(
                "{}/bot{}/setWebhook",
                self.api_base.trim_end_matches('/'),
                credential.redacted()
            ),
            redacted_callback_url: compose_callback(origin, &credential.redacted()),
        })
    }

    /// Sends one setWebhook call and classifies the response.
    ///
    /// An invalid base host fails before the poster is touched. Transport failures are returned
    /// as [`RegistrarError::Transport`] and never retried. Any response with a status line is
    /// `Ok`: 2xx is [`RegistrationResult::Success`], anything else [`RegistrationResult::Failure`].
    pub async fn register(
        &self,
        credential: &BotCredential,
        base_host: &BaseHost,
    ) -> Result<RegistrationResult> {
        let request = self.prepare(credential, base_host)?;

        tracing::info!(
            url = %request.redacted_url(),
            callback_url = %request.redacted_callback_url(),
            "Registering webhook"
        );

        let response = match self.poster.post(request.url(), request.form()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "setWebhook request failed");
                return Err(e.into());
            }
        };

        tracing::info!(status = response.status, "setWebhook response");

        let result = RegistrationResult::from_response(response);
        if let RegistrationResult::Failure { reason, .. } = &result {
            tracing::warn!(reason = %reason, "Webhook registration rejected");
        }
        Ok(result)
    }
}

/// One-shot registration against [`TELEGRAM_API_BASE`].
pub async fn register<P: HttpPoster>(
    credential: &BotCredential,
    base_host: &BaseHost,
    poster: &P,
) -> Result<RegistrationResult> {
    WebhookRegistrar::new(poster)
        .register(credential, base_host)
        .await
}
