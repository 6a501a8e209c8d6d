//! # webhook-registrar
//!
//! Registers a Telegram bot webhook: validates the base host, composes the callback URL
//! (`<base_host>/webhook/<token>`) and the setWebhook URL, sends one form POST through an
//! injected [`HttpPoster`], and classifies the response as a [`RegistrationResult`].

pub mod error;
pub mod poster;
pub mod registrar;

pub use error::{RegistrarError, Result, TransportError};
pub use poster::{FormBody, HttpPoster, PostResponse, ReqwestPoster, DEFAULT_TIMEOUT};
pub use registrar::{
    callback_url, register, registration_url, validate_base_host, RegistrationRequest,
    RegistrationResult, WebhookRegistrar, TELEGRAM_API_BASE, WEBHOOK_PATH,
};
