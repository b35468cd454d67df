//! Sensitive-data heuristics for secure diagnostics.
//!
//! Only consulted when `secure_errors` is enabled. The patterns are
//! heuristics: a member name that looks like a credential, or text that looks
//! like a token, is replaced wholesale by [`REDACTED`].
use std::sync::LazyLock;

use regex::Regex;

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

// ---------------------------------------------------------------------------
// Compiled patterns
//
// The patterns are literals and always compile. The workspace bans expect()
// and unwrap(), so a failed compile falls back to "a^", which never matches.
// ---------------------------------------------------------------------------

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| {
        Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
    })
}

/// Member names that hold credentials or personal identifiers.
static SENSITIVE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)(password|passwd|secret|token|credential|auth|api[-_]?key|private|ssn|(^|[-_])pin($|[-_]|code))",
    )
});

/// `Bearer <token>` authorization values.
static BEARER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^bearer\s+\S+"));

/// Three base64url segments starting with an encoded JSON header.
static JWT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^eyJ[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$"));

/// Long hex strings: digests, API keys, session ids.
static HEX_SECRET_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9a-fA-F]{32,}$"));

/// Long unbroken base64 blobs.
static BASE64_SECRET_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[A-Za-z0-9+/]{40,}={0,2}$"));

/// Returns `true` if a member called `name` should never be displayed.
pub fn is_sensitive_name(name: &str) -> bool {
    SENSITIVE_NAME_RE.is_match(name)
}

/// Returns `true` if `text` looks like a secret regardless of where it sits.
pub fn is_sensitive_text(text: &str) -> bool {
    let text = text.trim();
    BEARER_RE.is_match(text)
        || JWT_RE.is_match(text)
        || HEX_SECRET_RE.is_match(text)
        || BASE64_SECRET_RE.is_match(text)
}

/// Drops the query string and fragment of a URI.
pub fn strip_uri_query(uri: &str) -> &str {
    uri.split(['?', '#']).next().unwrap_or(uri)
}
