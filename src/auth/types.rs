//! Credential types
//!
//! Secret values are wrapped so they never show up in `Debug` output or logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A string that redacts itself when formatted
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// AWS-style access key pair used by S3 and S3-compatible stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsCredentials {
    /// Access key id
    pub access_key_id: SecretString,

    /// Secret access key
    pub secret_access_key: SecretString,

    /// Optional session token (temporary credentials)
    #[serde(default)]
    pub session_token: Option<SecretString>,

    /// Optional region override
    #[serde(default)]
    pub region: Option<String>,
}

impl AwsCredentials {
    /// Create credentials from a key pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: SecretString::new(access_key_id),
            secret_access_key: SecretString::new(secret_access_key),
            session_token: None,
            region: None,
        }
    }

    /// Set the region
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a session token
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::new(token));
        self
    }
}

/// On-disk layout of a credentials file
///
/// ```yaml
/// aws:
///   access_key_id: AKIA...
///   secret_access_key: ...
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsFile {
    /// AWS section
    pub aws: AwsCredentials,
}
