//! Detail record storage
//!
//! Every retained record is written once under its range key. The backend is
//! chosen at startup from a closed set (`redis`, `memory`); any other name,
//! `dynamodb` included, is rejected as unsupported.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::config::RedisConfig;
use crate::error::{ConfigError, StoreError};
use crate::models::SemanticRecord;

/// Store contract used by the orchestrator
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist `record` under `key`, overwriting any previous value
    async fn store(&self, key: &str, record: &SemanticRecord) -> Result<(), StoreError>;
}

/// Storage backends selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Redis,
    /// Keeps records in process memory; useful for dry runs
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Redis => "redis",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(StorageBackend::Redis),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnsupportedStorage(other.to_string())),
        }
    }
}

/// Concrete store selected at startup
#[derive(Debug)]
pub enum Store {
    Redis(RedisStore),
    Memory(MemoryStore),
}

impl Store {
    /// Open the selected backend
    pub async fn connect(backend: StorageBackend, redis: &RedisConfig) -> Result<Self, StoreError> {
        match backend {
            StorageBackend::Redis => Ok(Store::Redis(RedisStore::connect(redis).await?)),
            StorageBackend::Memory => Ok(Store::Memory(MemoryStore::new())),
        }
    }
}

#[async_trait]
impl RecordStore for Store {
    async fn store(&self, key: &str, record: &SemanticRecord) -> Result<(), StoreError> {
        match self {
            Store::Redis(store) => store.store(key, record).await,
            Store::Memory(store) => store.store(key, record).await,
        }
    }
}

/// Compact JSON body written for each record
pub fn encode_record(key: &str, record: &SemanticRecord) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("redis".parse::<StorageBackend>().unwrap(), StorageBackend::Redis);
        assert_eq!("Redis".parse::<StorageBackend>().unwrap(), StorageBackend::Redis);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
    }

    #[test]
    fn test_unknown_backends_are_unsupported() {
        let err = "DynamoDB".parse::<StorageBackend>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported storage type: dynamodb");

        let err = "postgres".parse::<StorageBackend>().unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedStorage("postgres".to_string()));
    }

    #[tokio::test]
    async fn test_memory_backend_through_store() {
        let store = Store::connect(StorageBackend::Memory, &RedisConfig {
            host: "unused".to_string(),
            port: 6379,
            db: 0,
            password: None,
        })
        .await
        .unwrap();

        let mut record = SemanticRecord::new();
        record.insert("Brand", "VISA");
        store.store("key1", &record).await.unwrap();

        match store {
            Store::Memory(memory) => {
                assert_eq!(memory.get("key1").as_deref(), Some(r#"{"Brand":"VISA"}"#));
            },
            Store::Redis(_) => panic!("expected memory store"),
        }
    }
}
