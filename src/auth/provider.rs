//! Secret provider implementations

use super::types::{AwsCredentials, CredentialsFile};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Source of object-store credentials
///
/// `acquire` is called when a storage client is built. The returned value is
/// owned by the caller and should be dropped once the client exists.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch credentials, or `None` to let the store fall back to its own
    /// defaults (instance profile, workload identity, anonymous access)
    async fn acquire(&self) -> Result<Option<AwsCredentials>>;

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}

/// No explicit credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecrets;

#[async_trait]
impl SecretProvider for NoSecrets {
    async fn acquire(&self) -> Result<Option<AwsCredentials>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Credentials held in memory
#[derive(Debug, Clone)]
pub struct StaticSecretProvider {
    credentials: AwsCredentials,
}

impl StaticSecretProvider {
    /// Create a provider that always returns the given credentials
    pub fn new(credentials: AwsCredentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn acquire(&self) -> Result<Option<AwsCredentials>> {
        Ok(Some(self.credentials.clone()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Credentials read from a YAML file on every acquisition
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    path: PathBuf,
}

impl FileSecretProvider {
    /// Create a provider backed by the given file
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    async fn acquire(&self) -> Result<Option<AwsCredentials>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::credentials(format!(
                "Failed to read credentials file {}: {e}",
                self.path.display()
            ))
        })?;

        let file: CredentialsFile = serde_yaml::from_str(&contents).map_err(|e| {
            Error::credentials(format!(
                "Invalid credentials file {}: {e}",
                self.path.display()
            ))
        })?;

        if file.aws.access_key_id.is_empty() || file.aws.secret_access_key.is_empty() {
            return Err(Error::credentials(format!(
                "Credentials file {} has an empty access key",
                self.path.display()
            )));
        }

        Ok(Some(file.aws))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Credentials read from the standard AWS environment variables
///
/// Only reads the environment; it never sets variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn acquire(&self) -> Result<Option<AwsCredentials>> {
        let (Ok(key), Ok(secret)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) else {
            return Ok(None);
        };

        let mut credentials = AwsCredentials::new(key, secret);
        if let Ok(token) = std::env::var("AWS_SESSION_TOKEN") {
            credentials = credentials.with_session_token(token);
        }
        if let Ok(region) = std::env::var("AWS_REGION") {
            credentials = credentials.with_region(region);
        }
        Ok(Some(credentials))
    }

    fn name(&self) -> &'static str {
        "env"
    }
}
