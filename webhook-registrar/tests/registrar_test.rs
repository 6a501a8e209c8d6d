//! Integration tests for [`webhook_registrar::WebhookRegistrar`] with a spy poster.
//!
//! Covers: the recorded setWebhook URL and form field, 2xx/non-2xx classification,
//! transport failures, and fail-fast base-host validation with zero poster calls.

use std::sync::Mutex;

use async_trait::async_trait;
use webhook_core::{resolve_default, BaseHost, BotCredential, ConfigSource};
use webhook_registrar::{
    register, FormBody, HttpPoster, PostResponse, RegistrarError, RegistrationResult,
    TransportError, WebhookRegistrar,
};

/// Records every call and answers with a scripted reply.
struct SpyPoster {
    reply: Result<PostResponse, TransportError>,
    calls: Mutex<Vec<(String, FormBody)>>,
}

impl SpyPoster {
    fn responding(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(PostResponse {
                status,
                body: body.to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: TransportError) -> Self {
        Self {
            reply: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, FormBody)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpPoster for SpyPoster {
    async fn post(&self, url: &str, form: &FormBody) -> Result<PostResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), form.clone()));
        self.reply.clone()
    }
}

fn credential(token: &str) -> BotCredential {
    BotCredential::new(token).unwrap()
}

/// **Test: Config to successful registration.**
///
/// **Setup:** config `TELEGRAM_BOT_TOKEN=abc123`, base host `https://my.app`, poster answers 200 `{"ok":true}`.
/// **Expected:** `Success` with the raw body; one POST to `https://api.telegram.org/botabc123/setWebhook`
/// with `url=https://my.app/webhook/abc123`.
#[tokio::test]
async fn register_success_end_to_end() {
    let source = ConfigSource::parse("TELEGRAM_BOT_TOKEN=abc123\nWEBHOOK_BASE_HOST=https://my.app\n");
    let resolved = resolve_default(&source).unwrap();

    let registrar = WebhookRegistrar::new(SpyPoster::responding(200, r#"{"ok":true}"#));
    let result = registrar
        .register(&resolved.credential, &resolved.base_host)
        .await
        .unwrap();

    assert_eq!(
        result,
        RegistrationResult::Success {
            body: r#"{"ok":true}"#.to_string()
        }
    );

    let calls = registrar.poster().calls();
    assert_eq!(calls.len(), 1);
    let (url, form) = &calls[0];
    assert_eq!(url, "https://api.telegram.org/botabc123/setWebhook");
    assert_eq!(
        form.fields(),
        &[("url".to_string(), "https://my.app/webhook/abc123".to_string())]
    );
}

/// **Test: Non-2xx is a domain failure, not an error.**
///
/// **Expected:** `Failure("http_status_401", body)`.
#[tokio::test]
async fn register_unauthorized_is_failure() {
    let body = r#"{"ok":false,"description":"Unauthorized"}"#;
    let poster = SpyPoster::responding(401, body);

    let result = register(&credential("abc123"), &BaseHost::new("https://my.app"), &poster)
        .await
        .unwrap();

    assert_eq!(
        result,
        RegistrationResult::Failure {
            reason: "http_status_401".to_string(),
            body: body.to_string()
        }
    );
    assert_eq!(poster.calls().len(), 1);
}

/// **Test: 2xx with `ok:false` in the body is still Success (status is authoritative).**
#[tokio::test]
async fn register_status_is_authoritative() {
    let body = r#"{"ok":false,"description":"Bad Request: bad webhook"}"#;
    let poster = SpyPoster::responding(200, body);

    let result = register(&credential("abc123"), &BaseHost::new("https://my.app"), &poster)
        .await
        .unwrap();
    assert!(result.is_success());
    assert_eq!(result.body(), body);
}

/// **Test: Transport failure propagates as an error, called once.**
#[tokio::test]
async fn register_connection_error_is_transport_error() {
    let cause = TransportError::Connect("connection refused".to_string());
    let poster = SpyPoster::failing(cause.clone());

    let err = register(&credential("abc123"), &BaseHost::new("https://my.app"), &poster)
        .await
        .unwrap_err();

    match err {
        RegistrarError::Transport(e) => assert_eq!(e, cause),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(poster.calls().len(), 1);
}

/// **Test: Non-HTTPS base host fails before any network call.**
///
/// **Expected:** `InvalidBaseHost`; the spy records zero calls.
#[tokio::test]
async fn register_http_base_host_fails_fast() {
    let poster = SpyPoster::responding(200, r#"{"ok":true}"#);

    for host in ["http://example.com", "https://example.com/hooks", "not a url"] {
        let err = register(&credential("abc123"), &BaseHost::new(host), &poster)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::InvalidBaseHost { .. }), "{host}");
    }
    assert!(poster.calls().is_empty());
}

/// **Test: Token needing encoding is encoded only in the callback URL.**
///
/// **Expected:** callback holds `%20`; the registration URL keeps `bot<token>` raw.
#[tokio::test]
async fn register_token_with_space() {
    let registrar = WebhookRegistrar::new(SpyPoster::responding(200, "{}"));
    registrar
        .register(&credential("abc 123"), &BaseHost::new("https://my.app/"))
        .await
        .unwrap();

    let calls = registrar.poster().calls();
    let (url, form) = &calls[0];
    assert_eq!(url, "https://api.telegram.org/botabc 123/setWebhook");
    assert_eq!(form.get("url"), Some("https://my.app/webhook/abc%20123"));
}

/// **Test: Custom API base replaces the Telegram origin.**
#[tokio::test]
async fn register_custom_api_base() {
    let registrar = WebhookRegistrar::new(SpyPoster::responding(200, "{}"))
        .with_api_base("http://localhost:8081/");
    registrar
        .register(&credential("abc123"), &BaseHost::new("https://my.app"))
        .await
        .unwrap();

    assert_eq!(
        registrar.poster().calls()[0].0,
        "http://localhost:8081/botabc123/setWebhook"
    );
}

/// **Test: Prepared request hides the token in Debug and redacted accessors.**
#[test]
fn prepare_redacts_token() {
    let registrar = WebhookRegistrar::new(SpyPoster::responding(200, "{}"));
    let request = registrar
        .prepare(
            &credential("123456:SECRET-TOKEN-wxyz"),
            &BaseHost::new("https://my.app"),
        )
        .unwrap();

    assert_eq!(
        request.url(),
        "https://api.telegram.org/bot123456:SECRET-TOKEN-wxyz/setWebhook"
    );
    assert_eq!(
        request.callback_url(),
        "https://my.app/webhook/123456:SECRET-TOKEN-wxyz"
    );
    assert_eq!(
        request.redacted_url(),
        "https://api.telegram.org/bot***wxyz/setWebhook"
    );
    assert_eq!(request.redacted_callback_url(), "https://my.app/webhook/***wxyz");
    assert!(!format!("{:?}", request).contains("SECRET"));
    assert!(registrar.poster().calls().is_empty());
}

/// **Test: Lenient URL forms are rejected before any call.**
///
/// **Setup:** base hosts the URL parser would silently normalize (missing `//`, backslashes,
/// embedded tab, dot segment, uppercase scheme).
/// **Expected:** `InvalidBaseHost` for each; the spy records zero calls.
#[tokio::test]
async fn register_rejects_normalizable_base_hosts() {
    let poster = SpyPoster::responding(200, r#"{"ok":true}"#);

    for host in [
        "https:my.app",
        "https:\\\\my.app",
        "https://my.a\tpp",
        "https://my.app/.",
        "HTTPS://my.app",
    ] {
        let err = register(&credential("abc123"), &BaseHost::new(host), &poster)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::InvalidBaseHost { .. }), "{host:?}");
    }
    assert!(poster.calls().is_empty());
}

/// **Test: Callback URL is exactly `base + "/webhook/" + token` for URL-safe tokens.**
///
/// **Setup:** every pairing of several valid base hosts (no trailing slash) and URL-safe tokens.
/// **Expected:** the recorded `url` field equals the plain concatenation.
#[tokio::test]
async fn register_callback_is_plain_concatenation() {
    let hosts = [
        "https://my.app",
        "https://bot.example.com:8443",
        "https://127.0.0.1:88",
        "https://[::1]",
    ];
    let tokens = [
        "abc123",
        "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw",
        "tok-en_with.safe~chars",
    ];

    for host in hosts {
        for token in tokens {
            let registrar = WebhookRegistrar::new(SpyPoster::responding(200, "{}"));
            registrar
                .register(&credential(token), &BaseHost::new(host))
                .await
                .unwrap();

            let calls = registrar.poster().calls();
            let expected = format!("{}/webhook/{}", host, token);
            assert_eq!(calls[0].1.get("url"), Some(expected.as_str()), "{host} {token}");
        }
    }
}
