//! Credential redaction for logs and error text.

/// Redacts a bot token for safe logging: `***` followed by the last 4 characters.
/// Tokens of 8 characters or fewer return `***` so that no part of a short secret leaks.
pub fn redact_token(token: &str) -> String {
    let chars = token.chars().count();
    if chars <= 8 {
        return "***".to_string();
    }
    let tail: String = token.chars().skip(chars - 4).collect();
    format!("***{}", tail)
}
