use super::SourceError;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
/// An object in an S3 compatible store
pub struct ObjectLocation {
    endpoint: String,
    bucket: String,
    key: String,
}

impl ObjectLocation {
    /// HTTPS endpoint of the store
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Bucket holding the database
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key within the bucket
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A parsed database location
pub enum SourceUrl {
    /// `file://<path>`, absolute or relative
    LocalFile(PathBuf),
    /// `s3://<endpoint-host>/<bucket>/<key...>`
    ObjectStore(ObjectLocation),
}

impl SourceUrl {
    /// Parse a configured location string
    pub fn parse(location: &str) -> Result<SourceUrl, SourceError> {
        let invalid = |reason: String| SourceError::ConfigurationInvalid {
            location: location.to_string(),
            reason,
        };
        let url = Url::parse(location).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "file" => file_path(&url)
                .map(SourceUrl::LocalFile)
                .ok_or_else(|| invalid("path is not valid UTF-8".to_string())),
            "s3" => object_location(&url)
                .map(SourceUrl::ObjectStore)
                .ok_or_else(|| invalid("expected s3://<endpoint>/<bucket>/<key>".to_string())),
            scheme => Err(invalid(format!("unsupported scheme {:?}", scheme))),
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceUrl::LocalFile(path) => write!(f, "file://{}", path.display()),
            SourceUrl::ObjectStore(object) => write!(
                f,
                "s3://{}/{}",
                object.endpoint.trim_start_matches("https://"),
                object
            ),
        }
    }
}

fn decode(text: &str) -> Option<String> {
    percent_decode_str(text)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

// `file://relative/db.kdbx` parses with `relative` as the host, so a host
// other than localhost is the first segment of a relative path.
fn file_path(url: &Url) -> Option<PathBuf> {
    match url.host_str() {
        Some(host) if !host.is_empty() && host != "localhost" => {
            decode(&format!("{}{}", host, url.path())).map(PathBuf::from)
        }
        _ => match url.to_file_path() {
            Ok(path) => Some(path),
            Err(()) => decode(url.path()).map(PathBuf::from),
        },
    }
}

fn object_location(url: &Url) -> Option<ObjectLocation> {
    let host = url.host_str().filter(|host| !host.is_empty())?;
    let endpoint = match url.port() {
        Some(port) => format!("https://{}:{}", host, port),
        None => format!("https://{}", host),
    };
    let mut segments = url.path_segments()?;
    let bucket = segments.next().and_then(decode).filter(|b| !b.is_empty())?;
    let key = segments.map(decode).collect::<Option<Vec<_>>>()?.join("/");
    if key.is_empty() {
        return None;
    }
    Some(ObjectLocation {
        endpoint,
        bucket,
        key,
    })
}
