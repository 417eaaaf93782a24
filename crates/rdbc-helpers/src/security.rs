//! Credential redaction for logged SQL and connection URLs.
//!
//! Provides:
//! - Statement redaction for AWS credentials embedded in Redshift
//!   `COPY`/`UNLOAD` statements
//! - Password masking for connection URLs
//!
//! Every statement and URL the helpers log passes through these functions
//! first.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Text substituted for every redacted credential
pub const REDACTED_PLACEHOLDER: &str = "<removed>";

/// Password substituted into redacted URLs
const URL_PASSWORD_MASK: &str = "***";

/// AWS key id (20 chars, terminated by `;`) or secret key (40-41 chars).
static AWS_CREDENTIALS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)aws_access_key_id\s*=\s*.{20}\s*;\s*|aws_secret_access_key\s*=\s*[A-Za-z0-9_/]{40,41}",
    )
    .expect("credential pattern is valid")
});

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Remove credentials from a SQL statement so it can be logged.
///
/// Replaces `aws_access_key_id=<20 chars>;` and
/// `aws_secret_access_key=<40-41 chars>` (case-insensitive, whitespace
/// allowed around `=` and before `;`) with [`REDACTED_PLACEHOLDER`], then
/// collapses every whitespace run to a single space. Anything that
/// implements `Display` is accepted and rendered first.
///
/// # Examples
///
/// ```
/// use rdbc_helpers::security::redact_statement;
///
/// let stmt = "copy t from 's3://bucket/key'\n  credentials \
///             'aws_access_key_id=AKKKKKBBBBBLMA3HAAAA;\
///             aws_secret_access_key=QQQQQEQeeeeeenUWiCgWWWuzRjwZZZZZtOvU9alP'";
/// assert_eq!(
///     redact_statement(stmt),
///     "copy t from 's3://bucket/key' credentials '<removed><removed>'"
/// );
/// ```
pub fn redact_statement<S: fmt::Display + ?Sized>(statement: &S) -> String {
    let text = statement.to_string();
    let stripped = AWS_CREDENTIALS_REGEX.replace_all(&text, REDACTED_PLACEHOLDER);
    WHITESPACE_REGEX.replace_all(&stripped, " ").into_owned()
}

/// Mask the password of a connection URL.
///
/// URLs that do not parse, or that carry no password, are returned
/// unchanged apart from parsing normalization.
///
/// # Examples
///
/// ```
/// use rdbc_helpers::security::redact_url;
///
/// assert_eq!(
///     redact_url("postgres://app:hunter2@db:5432/sales"),
///     "postgres://app:***@db:5432/sales"
/// );
/// assert_eq!(redact_url("sqlite::memory:"), "sqlite::memory:");
/// ```
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some(URL_PASSWORD_MASK)).is_err() {
                return URL_PASSWORD_MASK.to_string();
            }
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}
