//! Input and output locations
//!
//! A location is either a local path or an `s3://bucket/key` object. For the
//! index output, a directory (an existing local directory, or any location
//! ending in `/`) receives the descriptor's canonical index file name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::config::S3Config;
use crate::error::LocationError;

const S3_SCHEME: &str = "s3://";

/// Buffered input opened by [`LocationIo::open`]
pub type InputStream = Pin<Box<dyn AsyncBufRead + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    S3 { bucket: String, key: String },
}

impl Location {
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LocationError::Invalid(raw.to_string()));
        }

        match raw.strip_prefix(S3_SCHEME) {
            Some(rest) => {
                let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
                if bucket.is_empty() {
                    return Err(LocationError::Invalid(raw.to_string()));
                }
                Ok(Location::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            },
            None => Ok(Location::Local(PathBuf::from(raw))),
        }
    }

    /// Where the index file goes when this location is the `--index` target
    pub fn index_target(&self, file_name: &str) -> Location {
        match self {
            Location::Local(path) if is_local_dir(path) => Location::Local(path.join(file_name)),
            Location::Local(path) => Location::Local(path.clone()),
            Location::S3 { bucket, key } if key.is_empty() || key.ends_with('/') => Location::S3 {
                bucket: bucket.clone(),
                key: format!("{}{}", key, file_name),
            },
            Location::S3 { .. } => self.clone(),
        }
    }
}

fn is_local_dir(path: &Path) -> bool {
    path.is_dir() || path.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR)
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::S3 { bucket, key } => write!(f, "{}{}/{}", S3_SCHEME, bucket, key),
        }
    }
}

/// Reads and writes locations; the S3 client is created on first use
pub struct LocationIo {
    s3: S3Config,
    client: OnceCell<Client>,
}

impl LocationIo {
    pub fn new(s3: S3Config) -> Self {
        Self {
            s3,
            client: OnceCell::new(),
        }
    }

    /// Open `location` as a buffered byte stream
    ///
    /// Nothing beyond the reader's buffer is held in memory, so callers can
    /// consume the input one line at a time.
    #[instrument(skip_all, fields(location = %location))]
    pub async fn open(&self, location: &Location) -> Result<InputStream, LocationError> {
        match location {
            Location::Local(path) => {
                let file = File::open(path).await.map_err(|source| LocationError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(Box::pin(BufReader::new(file)))
            },
            Location::S3 { bucket, key } => {
                debug!("Streaming from s3://{}/{}", bucket, key);

                let response = self
                    .client()
                    .await
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| s3_error(bucket, key, DisplayErrorContext(&e)))?;

                debug!(
                    content_length = ?response.content_length(),
                    "Opened s3://{}/{}",
                    bucket,
                    key
                );
                Ok(Box::pin(response.body.into_async_read()))
            },
        }
    }

    #[instrument(skip_all, fields(location = %location, bytes = data.len()))]
    pub async fn write(&self, location: &Location, data: Vec<u8>) -> Result<(), LocationError> {
        match location {
            Location::Local(path) => {
                tokio::fs::write(path, data)
                    .await
                    .map_err(|source| LocationError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            },
            Location::S3 { bucket, key } => {
                self.client()
                    .await
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .content_type("application/json")
                    .body(ByteStream::from(data))
                    .send()
                    .await
                    .map_err(|e| s3_error(bucket, key, DisplayErrorContext(&e)))?;

                info!("Successfully uploaded to s3://{}/{}", bucket, key);
                Ok(())
            },
        }
    }

    async fn client(&self) -> &Client {
        self.client.get_or_init(|| build_client(&self.s3)).await
    }
}

async fn build_client(config: &S3Config) -> Client {
    let region = Region::new(config.region.clone());

    let mut builder = match (&config.access_key, &config.secret_key) {
        (Some(access_key), Some(secret_key)) => {
            let credentials = Credentials::new(access_key, secret_key, None, None, "bin-indexer");
            aws_sdk_s3::Config::builder()
                .credentials_provider(credentials)
                .region(region)
        },
        _ => {
            // Fall back to the default provider chain (profile, IMDS, ...)
            let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(region)
                .load()
                .await;
            aws_sdk_s3::config::Builder::from(&shared)
        },
    };

    builder = builder.force_path_style(config.path_style);
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }

    debug!(region = %config.region, endpoint = ?config.endpoint, "S3 client initialized");
    Client::from_conf(builder.build())
}

fn s3_error(bucket: &str, key: &str, error: impl fmt::Display) -> LocationError {
    LocationError::S3 {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_parse_s3() {
        assert_eq!(
            Location::parse("s3://bins/indexes/redsys.index").unwrap(),
            Location::S3 {
                bucket: "bins".to_string(),
                key: "indexes/redsys.index".to_string()
            }
        );
        assert!(matches!(Location::parse("s3:///key"), Err(LocationError::Invalid(_))));
        assert!(Location::parse("  ").is_err());
    }

    #[test]
    fn test_s3_prefix_gets_index_name() {
        let target = Location::parse("s3://bins/indexes/").unwrap().index_target("redsys.index");
        assert_eq!(target.to_string(), "s3://bins/indexes/redsys.index");

        let target = Location::parse("s3://bins").unwrap().index_target("mastercard.index");
        assert_eq!(target.to_string(), "s3://bins/mastercard.index");

        let target = Location::parse("s3://bins/custom.json").unwrap().index_target("redsys.index");
        assert_eq!(target.to_string(), "s3://bins/custom.json");
    }

    #[test]
    fn test_local_directory_gets_index_name() {
        let dir = tempfile::tempdir().unwrap();
        let location = Location::Local(dir.path().to_path_buf());

        assert_eq!(
            location.index_target("redsys.index"),
            Location::Local(dir.path().join("redsys.index"))
        );

        let file = Location::Local(dir.path().join("out.json"));
        assert_eq!(file.index_target("redsys.index"), file);
    }

    #[tokio::test]
    async fn test_local_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let location = Location::Local(dir.path().join("data.txt"));
        let io = LocationIo::new(Config::default().s3);

        io.write(&location, b"10ABC\r\n90".to_vec()).await.unwrap();

        let mut content = Vec::new();
        io.open(&location)
            .await
            .unwrap()
            .read_to_end(&mut content)
            .await
            .unwrap();
        assert_eq!(content, b"10ABC\r\n90");
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let io = LocationIo::new(Config::default().s3);
        let result = io
            .open(&Location::Local(PathBuf::from("/nonexistent/bins.txt")))
            .await;
        assert!(matches!(result, Err(LocationError::Io { .. })));
    }
}
