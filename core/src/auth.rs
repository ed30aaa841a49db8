//! OAuth2 access token as handed to the client by the caller.
//!
//! Token acquisition and refresh happen elsewhere; this module only answers
//! "may this token be sent right now?".

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An OAuth2 access token and its optional expiry instant.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_at: Option<SystemTime>,
}

impl AccessToken {
    /// A token with no known expiry.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(token: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Build from the `expires_in` seconds returned by the OAuth2 token
    /// endpoint, counted from `issued_at`.
    pub fn expiring_in(token: impl Into<String>, issued_at: SystemTime, expires_in: u64) -> Self {
        Self::with_expiry(token, issued_at + Duration::from_secs(expires_in))
    }

    /// Build from an expiry in milliseconds since the Unix epoch; `0` means
    /// no expiry.
    pub fn from_epoch_millis(token: impl Into<String>, expires_at_ms: u64) -> Self {
        if expires_at_ms == 0 {
            return Self::new(token);
        }
        Self::with_expiry(token, UNIX_EPOCH + Duration::from_millis(expires_at_ms))
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Non-empty and not expired at `now`.
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        if self.token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expiry) => now < expiry,
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(SystemTime::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
