use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use object_store::aws::{AmazonS3Builder, AmazonS3ConfigKey, AwsAuthorizer, AwsCredential};
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;
use url::Url;

use crate::cli::StorageBackend;
use crate::error::{HarnessError, HarnessResult};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9000";
pub const DEFAULT_REGION: &str = "us-east-1";
const MIN_BUCKET_NAME_LEN: usize = 3;
const MAX_BUCKET_NAME_LEN: usize = 63;
static ISOLATION_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Clone)]
pub struct Credentials {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Environment handed to the query tool.
    pub fn env_vars(&self) -> [(&'static str, &str); 3] {
        [
            ("AWS_ACCESS_KEY_ID", self.access_key_id.as_str()),
            ("AWS_SECRET_ACCESS_KEY", self.secret_access_key.as_str()),
            ("AWS_REGION", self.region.as_str()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    backend: StorageBackend,
    endpoint: Option<Url>,
    local_root: PathBuf,
    options: HashMap<String, String>,
}

impl StorageConfig {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Local,
            endpoint: None,
            local_root: root.into(),
            options: HashMap::new(),
        }
    }

    pub fn new(
        backend: StorageBackend,
        endpoint: &str,
        local_root: PathBuf,
        options: HashMap<String, String>,
    ) -> HarnessResult<Self> {
        let endpoint = match backend {
            StorageBackend::Local => {
                if !options.is_empty() {
                    return Err(HarnessError::InvalidArgument(
                        "storage options are only supported for the s3 backend".to_string(),
                    ));
                }
                None
            }
            StorageBackend::S3 => {
                let parsed = Url::parse(endpoint).map_err(|e| {
                    HarnessError::InvalidArgument(format!(
                        "invalid endpoint URL '{endpoint}': {e}"
                    ))
                })?;
                validate_endpoint_scheme(&parsed)?;
                Some(parsed)
            }
        };

        Ok(Self {
            backend,
            endpoint,
            local_root,
            options,
        })
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    fn s3_endpoint(&self) -> HarnessResult<&Url> {
        self.endpoint.as_ref().ok_or_else(|| {
            HarnessError::InvalidArgument("s3 operations require an endpoint URL".to_string())
        })
    }

}

/// Bucket creation and object upload for one backend.
#[derive(Clone, Debug)]
pub struct ObjectStorage {
    config: StorageConfig,
    credentials: Credentials,
    http: reqwest::Client,
}

impl ObjectStorage {
    pub fn new(config: StorageConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
            http: reqwest::Client::new(),
        }
    }

    pub async fn create_container(&self, name: &str) -> HarnessResult<()> {
        validate_bucket_name(name)?;
        match self.config.backend {
            StorageBackend::Local => {
                tokio::fs::create_dir_all(self.config.local_root.join(name)).await?;
            }
            StorageBackend::S3 => self.create_s3_bucket(name).await?,
        }
        debug!(bucket = name, backend = ?self.config.backend, "created container");
        Ok(())
    }

    pub async fn put_object(&self, container: &str, key: &str, bytes: Bytes) -> HarnessResult<()> {
        let size = bytes.len();
        let (store, location): (Arc<dyn ObjectStore>, ObjectPath) = match self.config.backend {
            StorageBackend::Local => {
                let container_dir = self.config.local_root.join(container);
                let is_dir = tokio::fs::metadata(&container_dir)
                    .await
                    .is_ok_and(|metadata| metadata.is_dir());
                if !is_dir {
                    return Err(HarnessError::Storage(format!(
                        "container '{container}' does not exist under {}",
                        self.config.local_root.display()
                    )));
                }
                let store = LocalFileSystem::new_with_prefix(&self.config.local_root)?;
                (Arc::new(store), ObjectPath::from(format!("{container}/{key}")))
            }
            StorageBackend::S3 => (self.s3_store(container)?, ObjectPath::from(key)),
        };
        store.put(&location, PutPayload::from(bytes)).await?;
        debug!(bucket = container, key, bytes = size, "uploaded object");
        Ok(())
    }

    /// URI the query tool reads the object from.
    pub fn source_uri(&self, container: &str, key: &str) -> HarnessResult<String> {
        match self.config.backend {
            StorageBackend::S3 => Ok(format!("s3://{container}/{key}")),
            StorageBackend::Local => {
                let root = if self.config.local_root.is_absolute() {
                    self.config.local_root.clone()
                } else {
                    std::env::current_dir()?.join(&self.config.local_root)
                };
                let path = root.join(container).join(key);
                Url::from_file_path(&path)
                    .map(String::from)
                    .map_err(|()| {
                        HarnessError::InvalidArgument(format!(
                            "failed to create source URI for {}",
                            path.display()
                        ))
                    })
            }
        }
    }

    async fn create_s3_bucket(&self, name: &str) -> HarnessResult<()> {
        let region = self.credentials.region.as_str();
        let endpoint = self.config.s3_endpoint()?;
        let mut url = endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                HarnessError::InvalidArgument(format!(
                    "endpoint '{endpoint}' cannot carry a bucket path"
                ))
            })?
            .pop_if_empty()
            .push(name);

        let mut builder = self.http.put(url);
        if region != DEFAULT_REGION {
            builder = builder.body(format!(
                "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
                 <LocationConstraint>{region}</LocationConstraint>\
                 </CreateBucketConfiguration>"
            ));
        }
        let mut request = builder.build()?;
        let credential = AwsCredential {
            key_id: self.credentials.access_key_id.clone(),
            secret_key: self.credentials.secret_access_key.clone(),
            token: None,
        };
        AwsAuthorizer::new(&credential, "s3", region).authorize(&mut request, None);

        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if body.contains("BucketAlreadyOwnedByYou") {
            debug!(bucket = name, "bucket already owned by caller");
            return Ok(());
        }
        Err(HarnessError::Storage(format!(
            "create bucket '{name}' failed with status {status}: {}",
            body.trim()
        )))
    }

    fn s3_store(&self, bucket: &str) -> HarnessResult<Arc<dyn ObjectStore>> {
        let endpoint = self.config.s3_endpoint()?;
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(endpoint.as_str().trim_end_matches('/'))
            .with_allow_http(endpoint.scheme() == "http")
            .with_virtual_hosted_style_request(false)
            .with_region(&self.credentials.region)
            .with_access_key_id(&self.credentials.access_key_id)
            .with_secret_access_key(&self.credentials.secret_access_key)
            .with_bucket_name(bucket);
        for (key, value) in &self.config.options {
            let key = key.parse::<AmazonS3ConfigKey>()?;
            builder = builder.with_config(key, value);
        }
        Ok(Arc::new(builder.build()?))
    }
}

/// Bucket name for one scenario run: the sanitized scenario name plus a
/// process-unique suffix, so repeated and concurrent runs never share a bucket.
pub fn bucket_name_for(scenario_name: &str) -> String {
    let suffix = next_isolation_suffix();
    let budget = MAX_BUCKET_NAME_LEN - suffix.len() - 1;
    let sanitized = sanitize_bucket_component(scenario_name);
    let mut base: String = sanitized.chars().take(budget).collect();
    while base.ends_with('-') {
        base.pop();
    }
    if base.is_empty() {
        base.push_str("scenario");
    }
    format!("{base}-{suffix}")
}

pub fn validate_bucket_name(name: &str) -> HarnessResult<()> {
    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&name.len()) {
        return Err(HarnessError::Storage(format!(
            "bucket name '{name}' must be {MIN_BUCKET_NAME_LEN}..={MAX_BUCKET_NAME_LEN} characters"
        )));
    }
    let valid_chars = name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'-' | b'.'));
    let alnum_edges = name
        .bytes()
        .next()
        .zip(name.bytes().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());
    if !valid_chars || !alnum_edges {
        return Err(HarnessError::Storage(format!(
            "bucket name '{name}' is invalid; allowed: [a-z0-9.-], starting and ending with [a-z0-9]"
        )));
    }
    Ok(())
}

fn validate_endpoint_scheme(endpoint: &Url) -> HarnessResult<()> {
    if matches!(endpoint.scheme(), "http" | "https") {
        return Ok(());
    }
    Err(HarnessError::InvalidArgument(format!(
        "endpoint '{endpoint}' is incompatible with backend s3; expected scheme one of: http://, https://"
    )))
}

fn sanitize_bucket_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn next_isolation_suffix() -> String {
    let counter = ISOLATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}-{counter}")
}
