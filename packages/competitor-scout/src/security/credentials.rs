//! API key handling.
//!
//! Keys for the search provider and the model gateway are wrapped in
//! `secrecy` so they never show up in logs, `Debug` output or errors.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually sending the secret.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// `Authorization` header value for bearer-token APIs.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Key and optional endpoint override for one external service.
#[derive(Clone)]
pub struct ServiceCredentials {
    pub api_key: SecretString,

    /// Overrides the service's default base URL
    pub base_url: Option<String>,
}

impl ServiceCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            base_url: None,
        }
    }

    /// Set the base URL. Blank values are ignored.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.trim().is_empty() {
            self.base_url = Some(url.trim().to_string());
        }
        self
    }
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug_or_display() {
        let secret = SecretString::new("sk-super-secret-key");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-super-secret-key");
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(SecretString::new("abc").bearer(), "Bearer abc");
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let creds = ServiceCredentials::new("sk-secret").with_base_url("https://gw.example.com");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gw.example.com"));
    }

    #[test]
    fn test_blank_base_url_ignored() {
        let creds = ServiceCredentials::new("k").with_base_url("  ");
        assert!(creds.base_url.is_none());
    }
}
