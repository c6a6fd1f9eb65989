use super::ObjectLocation;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::fmt;
use std::io::{Cursor, Read};
use zeroize::Zeroizing;

const DEFAULT_REGION: &str = "us-east-1";

/// Failure reported by an [`ObjectFetcher`]
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Retrieves objects from a remote store
pub trait ObjectFetcher {
    /// Fetch the object at `location`, blocking until it is available
    fn fetch(&self, location: &ObjectLocation) -> Result<Box<dyn Read + Send>, FetchError>;
}

impl<F> ObjectFetcher for F
where
    F: Fn(&ObjectLocation) -> Result<Box<dyn Read + Send>, FetchError>,
{
    fn fetch(&self, location: &ObjectLocation) -> Result<Box<dyn Read + Send>, FetchError> {
        self(location)
    }
}

#[derive(Clone)]
/// Static credentials for signed object store requests
pub struct S3Credentials {
    access_key: String,
    secret_key: Zeroizing<String>,
}

impl S3Credentials {
    /// Pair an access key with its secret
    pub fn new(access_key: String, secret_key: Zeroizing<String>) -> S3Credentials {
        S3Credentials {
            access_key,
            secret_key,
        }
    }
}

impl fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
/// Fetches objects from S3 compatible stores over HTTPS
///
/// Requests are unsigned unless credentials are supplied.
pub struct S3Fetcher {
    credentials: Option<S3Credentials>,
}

impl S3Fetcher {
    /// Create a fetcher, optionally signing requests with `credentials`
    pub fn new(credentials: Option<S3Credentials>) -> S3Fetcher {
        S3Fetcher { credentials }
    }

    fn store(&self, location: &ObjectLocation) -> object_store::Result<impl ObjectStore> {
        let builder = AmazonS3Builder::new()
            .with_endpoint(location.endpoint())
            .with_bucket_name(location.bucket())
            .with_region(DEFAULT_REGION)
            .with_allow_http(false);
        let builder = match &self.credentials {
            Some(credentials) => builder
                .with_access_key_id(credentials.access_key.as_str())
                .with_secret_access_key(credentials.secret_key.as_str()),
            None => builder.with_skip_signature(true),
        };
        builder.build()
    }
}

impl ObjectFetcher for S3Fetcher {
    fn fetch(&self, location: &ObjectLocation) -> Result<Box<dyn Read + Send>, FetchError> {
        let store = self.store(location)?;
        let path = ObjectPath::from(location.key());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let bytes = runtime.block_on(async { store.get(&path).await?.bytes().await })?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}
