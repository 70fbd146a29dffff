use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by an access token.
///
/// Timestamps are Unix seconds, matching the registered `iat`/`exp` claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Display name of the authenticated user
    pub name: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `name` valid for `lifetime` starting at `issued_at`.
    pub fn for_name(name: impl Into<String>, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            name: name.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }
}
