use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::{encode_record, RecordStore};
use crate::config::RedisConfig;
use crate::error::StoreError;
use crate::models::SemanticRecord;

/// Redis-backed store: one `SET key <json>` per record
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    endpoint: String,
}

impl RedisStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let url = config
            .connection_url()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let client = redis::Client::open(url.as_str())?;
        let connection = client.get_multiplexed_async_connection().await?;

        let endpoint = format!("{}:{}/{}", config.host, config.port, config.db);
        info!(endpoint = %endpoint, "Connected to Redis");

        Ok(Self {
            connection,
            endpoint,
        })
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn store(&self, key: &str, record: &SemanticRecord) -> Result<(), StoreError> {
        let body = encode_record(key, record)?;

        let mut connection = self.connection.clone();
        connection.set::<_, _, ()>(key, body).await?;

        debug!(key = %key, "Stored record");
        Ok(())
    }
}
