//! Line-oriented `KEY=VALUE` config source and credential resolution.
//!
//! [`ConfigSource`] holds already-loaded text; [`resolve`] extracts the bot token and the
//! base host from it. Reading the file is [`load_file`]'s job, not the resolver's.

use std::fmt;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::redact::redact_token;

/// Key holding the bot token.
pub const BOT_TOKEN_KEY: &str = "TELEGRAM_BOT_TOKEN";
/// Optional key overriding the externally reachable HTTPS origin.
pub const BASE_HOST_KEY: &str = "WEBHOOK_BASE_HOST";
/// Base host used when [`BASE_HOST_KEY`] is absent.
pub const DEFAULT_BASE_HOST: &str = "https://localhost:8443";

const COMMENT_MARKER: char = '#';

/// Ordered raw lines of a `KEY=VALUE` source. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    lines: Vec<String>,
}

impl ConfigSource {
    /// Splits loaded text into lines.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Well-formed pairs in source order. Comments, blank lines and lines without `=` are skipped.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.lines.iter().filter_map(|line| parse_line(line))
    }

    /// Value of the first pair named `key`, trimmed. Later duplicates are ignored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Splits on the first `=` only; the rest of the line, `=` included, is the value.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Bot token. `Debug` and `Display` print only the redacted form.
#[derive(Clone, PartialEq, Eq)]
pub struct BotCredential(String);

impl BotCredential {
    /// Returns `None` when the token is empty after trimming.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw secret. Only for building request URLs; never log it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn redacted(&self) -> String {
        redact_token(&self.0)
    }
}

impl fmt::Debug for BotCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BotCredential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for BotCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Scheme + host origin that the platform delivers updates to. Validated by the registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseHost(String);

impl BaseHost {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of [`resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credential: BotCredential,
    pub base_host: BaseHost,
}

/// Extracts the credential under `required_key` and the base host under `optional_key`.
///
/// The first occurrence of each key wins. A missing or empty credential is
/// [`ConfigError::MissingCredential`]; a missing or empty `optional_key` yields `default_value`.
pub fn resolve(
    source: &ConfigSource,
    required_key: &str,
    optional_key: &str,
    default_value: &str,
) -> Result<ResolvedConfig> {
    let credential = source
        .get(required_key)
        .and_then(BotCredential::new)
        .ok_or_else(|| ConfigError::MissingCredential {
            key: required_key.to_string(),
        })?;

    let base_host = match source.get(optional_key) {
        Some(value) if !value.is_empty() => BaseHost::new(value),
        _ => BaseHost::new(default_value),
    };

    tracing::debug!(
        key = required_key,
        token = %credential,
        base_host = %base_host,
        "Resolved webhook config"
    );

    Ok(ResolvedConfig {
        credential,
        base_host,
    })
}

/// [`resolve`] with [`BOT_TOKEN_KEY`], [`BASE_HOST_KEY`] and [`DEFAULT_BASE_HOST`].
pub fn resolve_default(source: &ConfigSource) -> Result<ResolvedConfig> {
    resolve(source, BOT_TOKEN_KEY, BASE_HOST_KEY, DEFAULT_BASE_HOST)
}

/// Reads a config file into a [`ConfigSource`].
pub fn load_file(path: impl AsRef<Path>) -> Result<ConfigSource> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(ConfigSource::parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_splits_on_first_equals() {
        assert_eq!(parse_line("URL=https://a.b/?x=1"), Some(("URL", "https://a.b/?x=1")));
        assert_eq!(parse_line("  KEY  =  value  "), Some(("KEY", "value")));
        assert_eq!(parse_line("KEY="), Some(("KEY", "")));
    }

    #[test]
    fn test_parse_line_ignores_noise() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# KEY=value"), None);
        assert_eq!(parse_line("   # KEY=value"), None);
        assert_eq!(parse_line("no equals sign"), None);
    }

    #[test]
    fn test_get_first_occurrence_wins() {
        let source = ConfigSource::parse("A=1\nA=2");
        assert_eq!(source.get("A"), Some("1"));
        assert_eq!(source.get("B"), None);
    }

    #[test]
    fn test_credential_rejects_blank() {
        assert!(BotCredential::new("").is_none());
        assert!(BotCredential::new("   ").is_none());
        assert_eq!(BotCredential::new(" abc ").unwrap().expose(), "abc");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = BotCredential::new("123456:SECRET-VALUE-wxyz").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("***wxyz"));
        assert_eq!(credential.to_string(), "***wxyz");
    }
}
