//! Error types for the BIN indexer
//!
//! Each pipeline layer owns a narrow error enum; [`IndexerError`] wraps them
//! for the orchestrator and the binary. Translation misses and reference-data
//! misses are deliberately absent: they are normal data, not failures.

use thiserror::Error;

/// Result type alias for indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Top-level error for a single ingestion run
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A line disagrees with the format descriptor; `line` is 1-based
    #[error("Decode error on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: DecodeError,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}

impl IndexerError {
    pub fn decode(line: usize, source: DecodeError) -> Self {
        Self::Decode { line, source }
    }
}

/// Startup problems: unknown formats, bad environment, invalid descriptors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Format '{0}' is invalid. It should be in the form 'Provider_Version'.")]
    MalformedFormat(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Unsupported storage type: {0}")]
    UnsupportedStorage(String),

    #[error("Invalid descriptor for '{format}': {reason}")]
    InvalidDescriptor { format: String, reason: String },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

impl ConfigError {
    pub fn invalid_descriptor(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            format: format.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_env(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A physical line cannot be turned into a range record
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("line is {actual} bytes but the layout needs {required}")]
    LineTooShort { required: usize, actual: usize },

    #[error("expected {expected} delimited fields, found {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[error("line is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing field {0}")]
    MissingField(String),

    #[error("{field} is not an account number: '{value}'")]
    InvalidBound { field: String, value: String },

    #[error("range low bound {low} is greater than high bound {high}")]
    InvertedRange { low: String, high: String },
}

/// The detail store rejected a write
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid connection settings: {0}")]
    Connection(String),
}

/// The range index rejected an insertion or could not be serialized
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("interval [{low}, {high}] is inverted")]
    InvertedInterval { low: String, high: String },

    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reading the input or publishing the index failed
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Invalid location '{0}'. Expected a local path or s3://bucket/key")]
    Invalid(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("S3 error on s3://{bucket}/{key}: {message}")]
    S3 {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to read input after line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// A textual range key could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("range key must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid base62 character '{0}'")]
    Character(char),

    #[error("range key value exceeds 160 bits")]
    Overflow,
}
