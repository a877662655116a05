//! S3-compatible object store client.
//!
//! The AWS SDK is asynchronous while the synchronisation engine is not, so
//! the store owns a current-thread Tokio runtime and blocks on each request.
//! Metadata requests are bounded by the configured timeout as a whole.
//! Uploads stream the asset body, so only their connection phase is bounded.

use art_keeper::checksums::{ChecksumAlgorithm, Digest};
use art_keeper::store::{ObjectStore, StoreError, StoredObject};
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, Checksum, CreateBucketConfiguration, ObjectAttributes,
};
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Region in which buckets are created without a location constraint.
const DEFAULT_LOCATION: &str = "us-east-1";

/// Content type attached to every uploaded object.
const OBJECT_CONTENT_TYPE: &str = "application/octet-stream";

/// Connection settings for an S3-compatible store.
#[derive(Clone)]
pub struct S3Settings {
    /// Endpoint URL, e.g. `http://localhost:9000` for MinIO.
    pub endpoint: String,
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region name.
    pub region: String,
    /// Destination bucket.
    pub bucket: String,
    /// Bound applied to connecting and to each metadata request.
    pub timeout: Duration,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Object store backed by `aws-sdk-s3`.
#[derive(Debug)]
pub struct S3Store {
    runtime: Runtime,
    client: S3Client,
    bucket: String,
    region: String,
    timeout: Duration,
}

impl S3Store {
    /// Connect to the store described by `settings`.
    ///
    /// Uses static credentials and path-style addressing, which MinIO and
    /// most self-hosted stores require.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the runtime cannot be started.
    pub fn connect(settings: &S3Settings) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "art-keeper",
        );
        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(aws_sdk_s3::config::Region::new(settings.region.clone()))
                .credentials_provider(credentials)
                .endpoint_url(&settings.endpoint)
                .timeout_config(
                    TimeoutConfig::builder()
                        .connect_timeout(settings.timeout)
                        .build(),
                )
                .load(),
        );
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();
        log::debug!(
            "object store client ready: endpoint={} region={} bucket={}",
            settings.endpoint,
            settings.region,
            settings.bucket
        );
        Ok(Self {
            runtime,
            client: S3Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            region: settings.region.clone(),
            timeout: settings.timeout,
        })
    }

    /// Name of the destination bucket.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Run a metadata request, failing it once the timeout elapses.
    fn request<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        self.runtime.block_on(async {
            tokio::time::timeout(self.timeout, call)
                .await
                .map_err(|_| StoreError::Timeout { operation })?
        })
    }

    /// Run a body transfer to completion however long it takes.
    fn transfer<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        self.runtime.block_on(call)
    }
}

impl ObjectStore for S3Store {
    fn bucket_exists(&self) -> Result<bool, StoreError> {
        self.request("head_bucket", async {
            match self.client.head_bucket().bucket(&self.bucket).send().await {
                Ok(_) => Ok(true),
                Err(err) => {
                    let service_err = err.into_service_error();
                    if service_err.is_not_found() {
                        Ok(false)
                    } else {
                        Err(request_error("head_bucket", &service_err))
                    }
                }
            }
        })
    }

    fn create_bucket(&self) -> Result<(), StoreError> {
        let mut request = self.client.create_bucket().bucket(&self.bucket);
        if let Some(configuration) = location_configuration(&self.region) {
            request = request.create_bucket_configuration(configuration);
        }
        self.request("create_bucket", async {
            request
                .send()
                .await
                .map(|_| ())
                .map_err(|err| request_error("create_bucket", &err.into_service_error()))
        })
    }

    fn stat_object(
        &self,
        name: &str,
        algorithm: ChecksumAlgorithm,
    ) -> Result<Option<StoredObject>, StoreError> {
        self.request("get_object_attributes", async {
            let result = self
                .client
                .get_object_attributes()
                .bucket(&self.bucket)
                .key(name)
                .object_attributes(ObjectAttributes::Checksum)
                .send()
                .await;
            match result {
                Ok(output) => {
                    let checksum = stored_checksum(output.checksum(), algorithm)?;
                    Ok(Some(StoredObject::new(checksum)))
                }
                Err(err) => {
                    let not_found_status =
                        err.raw_response().map(|raw| raw.status().as_u16()) == Some(404);
                    let service_err = err.into_service_error();
                    if service_err.is_no_such_key() || not_found_status {
                        Ok(None)
                    } else {
                        Err(request_error("get_object_attributes", &service_err))
                    }
                }
            }
        })
    }

    fn put_object(&self, local: &Path, name: &str, checksum: &Digest) -> Result<(), StoreError> {
        self.transfer(async {
            let body = ByteStream::from_path(local)
                .await
                .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
            let request = self
                .client
                .put_object()
                .bucket(&self.bucket)
                .key(name)
                .content_type(OBJECT_CONTENT_TYPE)
                .body(body);
            let encoded = checksum.to_base64();
            let with_checksum = match checksum.algorithm() {
                ChecksumAlgorithm::Sha256 => request.checksum_sha256(encoded),
                ChecksumAlgorithm::Sha1 => request.checksum_sha1(encoded),
            };
            with_checksum
                .send()
                .await
                .map(|_| ())
                .map_err(|err| request_error("put_object", &err.into_service_error()))
        })
    }
}

/// Bucket configuration for `region`, or `None` for the default location.
fn location_configuration(region: &str) -> Option<CreateBucketConfiguration> {
    (region != DEFAULT_LOCATION).then(|| {
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build()
    })
}

/// Decode the stored checksum for `algorithm` from an attributes response.
fn stored_checksum(
    checksum: Option<&Checksum>,
    algorithm: ChecksumAlgorithm,
) -> Result<Option<Digest>, StoreError> {
    let encoded = checksum.and_then(|c| match algorithm {
        ChecksumAlgorithm::Sha256 => c.checksum_sha256(),
        ChecksumAlgorithm::Sha1 => c.checksum_sha1(),
    });
    encoded
        .map(|value| Digest::from_base64(algorithm, value))
        .transpose()
        .map_err(|e| StoreError::InvalidChecksum {
            reason: e.to_string(),
        })
}

fn request_error(operation: &'static str, err: &impl std::fmt::Display) -> StoreError {
    StoreError::Request {
        operation,
        reason: err.to_string(),
    }
}
