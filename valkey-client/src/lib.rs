pub mod config;
pub mod error;

use config::ValkeyConfig;
use error::ValkeyResult;
use redis::{Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::OnceCell;

/// Append-only lists stored in Valkey, one list per key.
///
/// The connection is opened on first use. Once open, the [`ConnectionManager`]
/// reconnects on its own, so a log that lost its server keeps working once
/// the server is back.
pub struct MessageLog {
    client: Client,
    manager: OnceCell<ConnectionManager>,
}

impl MessageLog {
    /// Does no I/O; an unreachable server surfaces on the first command.
    pub fn new(config: &ValkeyConfig) -> ValkeyResult<Self> {
        let client = Client::open(config.url())?;

        Ok(Self {
            client,
            manager: OnceCell::new(),
        })
    }

    pub async fn connect(config: &ValkeyConfig) -> ValkeyResult<Self> {
        let log = Self::new(config)?;
        log.ping().await?;

        tracing::info!(endpoint = %config.endpoint(), "connected to valkey");
        Ok(log)
    }

    async fn connection(&self) -> ValkeyResult<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?;

        Ok(manager.clone())
    }

    /// Pushes `payload` to the tail of the list at `key` and returns the new length.
    pub async fn append(&self, key: &str, payload: &[u8]) -> ValkeyResult<usize> {
        let mut conn = self.connection().await?;
        let len = redis::cmd("RPUSH")
            .arg(key)
            .arg(payload)
            .query_async::<usize>(&mut conn)
            .await?;

        Ok(len)
    }

    pub async fn append_json<T: Serialize>(&self, key: &str, value: &T) -> ValkeyResult<usize> {
        let payload = serde_json::to_vec(value)?;
        self.append(key, &payload).await
    }

    /// Reads the inclusive range `start..=stop`; negative indices count from the tail.
    pub async fn range(&self, key: &str, start: isize, stop: isize) -> ValkeyResult<Vec<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let entries = redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async::<Vec<Vec<u8>>>(&mut conn)
            .await?;

        Ok(entries)
    }

    pub async fn range_json<T: DeserializeOwned>(&self, key: &str, start: isize, stop: isize) -> ValkeyResult<Vec<T>> {
        self.range(key, start, stop)
            .await?
            .iter()
            .map(|entry| serde_json::from_slice(entry).map_err(Into::into))
            .collect()
    }

    pub async fn len(&self, key: &str) -> ValkeyResult<usize> {
        let mut conn = self.connection().await?;
        let len = redis::cmd("LLEN").arg(key).query_async::<usize>(&mut conn).await?;

        Ok(len)
    }

    pub async fn ping(&self) -> ValkeyResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;

        Ok(())
    }
}
