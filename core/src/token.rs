//! Device token normalization and endpoint routing.
//!
//! Tokens are compared in their normalized form: every space removed and the
//! rest uppercased. A normalized token made of exactly 64 `[A-Z0-9]`
//! characters is an Apple device token; anything else (Android APIDs, channel
//! ids, the empty string) goes to the APID endpoint.

/// Length of an Apple device token in its hex form.
pub const APPLE_TOKEN_LEN: usize = 64;

/// Which registry endpoint a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Apple,
    Generic,
}

/// Strip all spaces and uppercase.
pub fn normalize(token: &str) -> String {
    token.chars().filter(|c| *c != ' ').collect::<String>().to_uppercase()
}

/// Classify an already-normalized token. Lowercase input is never Apple.
pub fn classify(normalized: &str) -> TokenKind {
    let is_apple = normalized.len() == APPLE_TOKEN_LEN
        && normalized
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if is_apple {
        TokenKind::Apple
    } else {
        TokenKind::Generic
    }
}

/// Relative API path for a raw, un-normalized token.
pub fn device_token_path(token: &str) -> String {
    let normalized = normalize(token);
    match classify(&normalized) {
        TokenKind::Apple => format!("/api/device_tokens/{normalized}"),
        TokenKind::Generic => format!("/api/apids/{normalized}"),
    }
}
