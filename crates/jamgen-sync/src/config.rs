//! R2 connection settings, read from the environment. R2 speaks the S3
//! protocol, so the store is built through the S3 builder with the
//! account-specific endpoint.

use std::env;
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;

use crate::SyncError;

/// Credentials and bucket location for the R2 bucket holding the archives.
#[derive(Debug, Clone)]
pub struct R2Config {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub endpoint: String,
}

impl R2Config {
    /// Read the connection settings from `R2_*` environment variables.
    /// The endpoint defaults to the account's EU jurisdiction endpoint.
    pub fn from_env() -> Result<Self, SyncError> {
        let account_id = require_env("R2_ACCOUNT_ID")?;
        let endpoint = env::var("R2_ENDPOINT")
            .unwrap_or_else(|_| format!("https://{account_id}.eu.r2.cloudflarestorage.com"));

        Ok(Self {
            access_key_id: require_env("R2_ACCESS_KEY_ID")?,
            secret_access_key: require_env("R2_SECRET_ACCESS_KEY")?,
            bucket: require_env("R2_BUCKET_NAME")?,
            account_id,
            endpoint,
        })
    }

    /// Build the object store client. R2 ignores the region but the S3
    /// protocol requires one; "auto" is what Cloudflare documents.
    pub fn build_store(&self) -> Result<Arc<dyn ObjectStore>, SyncError> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(&self.bucket)
            .with_endpoint(&self.endpoint)
            .with_access_key_id(&self.access_key_id)
            .with_secret_access_key(&self.secret_access_key)
            .with_region("auto")
            .build()?;

        Ok(Arc::new(store))
    }
}

fn require_env(name: &'static str) -> Result<String, SyncError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(SyncError::MissingEnv { name })
}
