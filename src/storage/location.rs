//! Storage locations (S3, R2, GCS, Azure, local)

use super::glob::GlobPattern;
use crate::auth::{AwsCredentials, SecretProvider};
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// An object store plus a base prefix inside it
#[derive(Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme (s3, r2, gs, az, file, memory)
    scheme: String,
    /// Location as given, for log lines and error messages
    url: String,
}

impl fmt::Debug for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLocation")
            .field("url", &self.url)
            .field("scheme", &self.scheme)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl StorageLocation {
    /// Open an existing location for reading
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` or `s3a://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    pub async fn open(url: &str, secrets: &dyn SecretProvider) -> Result<Self> {
        Self::parse(url, secrets, false).await
    }

    /// Open a location for writing, creating local directories as needed
    pub async fn create(url: &str, secrets: &dyn SecretProvider) -> Result<Self> {
        Self::parse(url, secrets, true).await
    }

    /// Wrap an already-built store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        let scheme = scheme.into();
        let url = format!("{scheme}://{prefix}");
        Self {
            store,
            prefix,
            scheme,
            url,
        }
    }

    async fn parse(url: &str, secrets: &dyn SecretProvider, create: bool) -> Result<Self> {
        let scheme = url.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
        match scheme.as_deref() {
            Some("s3" | "s3a") => {
                let credentials = secrets.acquire().await?;
                Self::parse_s3(url, credentials, false)
            }
            Some("r2") => {
                let credentials = secrets.acquire().await?;
                Self::parse_s3(url, credentials, true)
            }
            Some("gs") => Self::parse_gcs(url),
            Some("az") => Self::parse_azure(url),
            Some("file") | None => Self::parse_local(url, create),
            Some(other) => Err(Error::config(format!(
                "Unsupported storage scheme '{other}' in {url}"
            ))),
        }
    }

    /// Split `scheme://bucket/prefix` into bucket and prefix
    fn split_bucket(url: &str) -> Result<(String, String)> {
        let parsed = Url::parse(url)?;
        let bucket = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::config(format!("Missing bucket in URL: {url}")))?
            .to_string();
        let prefix = parsed.path().trim_matches('/').to_string();
        Ok((bucket, prefix))
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, credentials: Option<AwsCredentials>, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = Self::split_bucket(url)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);

        if let Some(credentials) = credentials {
            builder = builder
                .with_access_key_id(credentials.access_key_id.expose())
                .with_secret_access_key(credentials.secret_access_key.expose());
            if let Some(token) = &credentials.session_token {
                builder = builder.with_token(token.expose());
            }
            if let Some(region) = &credentials.region {
                builder = builder.with_region(region);
            }
        }

        // R2 endpoint: https://<account_id>.r2.cloudflarestorage.com
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            url: url.to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let (bucket, prefix) = Self::split_bucket(url)?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            url: url.to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let (container, prefix) = Self::split_bucket(url)?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            url: url.to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let local = path.strip_prefix("file://").unwrap_or(path);

        if create {
            std::fs::create_dir_all(local)
                .map_err(|e| Error::sink_write(local, format!("Failed to create directory: {e}")))?;
        } else if !std::path::Path::new(local).is_dir() {
            return Err(Error::source_read(local, "Directory does not exist"));
        }

        let store = LocalFileSystem::new_with_prefix(local)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?
            .with_automatic_cleanup(true);

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            url: path.to_string(),
        })
    }

    /// Check if this is a cloud destination (not local)
    pub fn is_cloud(&self) -> bool {
        !matches!(self.scheme.as_str(), "file" | "memory")
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The location as given
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Human-readable form of a key under this location
    pub fn display_path(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    /// Resolve a key relative to this location into a store path
    pub fn object_path(&self, key: &str) -> Result<ObjectPath> {
        let key = key.trim_matches('/');
        let full = match (self.prefix.is_empty(), key.is_empty()) {
            (true, _) => key.to_string(),
            (false, true) => self.prefix.clone(),
            (false, false) => format!("{}/{key}", self.prefix),
        };
        ObjectPath::parse(&full)
            .map_err(|e| Error::config(format!("Invalid object path '{full}': {e}")))
    }

    /// Strip this location's prefix from a store path
    pub fn relative_key(&self, path: &ObjectPath) -> String {
        let raw = path.as_ref();
        if self.prefix.is_empty() {
            return raw.to_string();
        }
        raw.strip_prefix(&self.prefix)
            .map_or(raw, |rest| rest.trim_start_matches('/'))
            .to_string()
    }

    /// List every object under a key prefix
    pub async fn list(&self, key_prefix: &str) -> Result<Vec<ObjectMeta>> {
        let prefix = self.object_path(key_prefix)?;
        let prefix = if prefix.as_ref().is_empty() {
            None
        } else {
            Some(prefix)
        };

        match self.store.list(prefix.as_ref()).try_collect::<Vec<_>>().await {
            Ok(objects) => Ok(objects),
            // A missing directory on the local filesystem lists as nothing
            Err(object_store::Error::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Keys (relative to this location) matching a glob, sorted
    pub async fn glob(&self, pattern: &GlobPattern) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .list(pattern.literal_prefix())
            .await?
            .iter()
            .map(|meta| self.relative_key(&meta.location))
            .filter(|key| pattern.matches(key))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Read a whole object
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key)?;
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| Error::source_read(self.display_path(key), e.to_string()))?;
        result
            .bytes()
            .await
            .map_err(|e| Error::source_read(self.display_path(key), e.to_string()))
    }

    /// Check whether an object exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.object_path(key)?;
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Write bytes to a key, returning the full path for logging
    pub async fn put(&self, key: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(key)?;
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::sink_write(self.display_path(key), e.to_string()))?;
        Ok(self.display_path(key))
    }

    /// Delete every object under a key prefix, returning how many were removed
    pub async fn delete_prefix(&self, key_prefix: &str) -> Result<usize> {
        let objects = self.list(key_prefix).await?;
        for meta in &objects {
            self.store.delete(&meta.location).await.map_err(|e| {
                let key = self.relative_key(&meta.location);
                Error::sink_write(self.display_path(&key), e.to_string())
            })?;
        }
        Ok(objects.len())
    }
}
