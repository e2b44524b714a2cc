use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Taste insight for a session, versioned by the number of ledger entries
    Insight { session_id: String, swipes: usize },
}

impl CacheKey {
    /// Glob matching every insight key of a session
    pub fn session_pattern(session_id: &str) -> String {
        format!("insight:{}:*", session_id)
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Insight { session_id, swipes } => {
                write!(f, "insight:{}:{}", session_id, swipes)
            }
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// A pending cache write
struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed cache with fire-and-forget writes
///
/// Reads go straight to Redis. Writes are queued on a channel and applied by a
/// background task so request handlers never wait on them.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Handle for stopping the background writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to flush queued writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        // Create channels for writes and shutdown signal
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        // Spawn background task to process cache writes
        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    async fn writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                // Process incoming writes
                Some(write) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, write).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                // Handle shutdown signal
                _ = shutdown_rx.recv() => {
                    // Stop accepting writes, then drain what is already queued
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(write) = write_rx.recv().await {
                        match Self::write_to_redis(&client, write).await {
                            Ok(()) => flushed += 1,
                            Err(e) => tracing::error!(error = %e, "Failed to flush cache write during shutdown"),
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, write: PendingWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(write.key, write.value, write.ttl).await?;
        Ok(())
    }

    /// Reads and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        // Deserialize on hit; a corrupt entry is an error, not a miss

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(data))
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Queues a write and returns immediately
    ///
    /// Serialization or queueing failures are logged, never returned.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        // Serialize up front so the writer only deals with strings
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value: json,
            ttl,
        };

        // Send to background writer (non-blocking)
        if let Err(e) = self.write_tx.send(write) {
            tracing::error!(error = %e, "Failed to queue cache write");
        }
    }

    /// Deletes every key matching `pattern`, returning how many were removed
    pub async fn delete_matching(&self, pattern: &str) -> AppResult<usize> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        // Walk the keyspace with SCAN so a large cache never blocks Redis
        let mut cursor: u64 = 0;
        let mut keys: Vec<String> = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        if keys.is_empty() {
            return Ok(0);
        }

        let removed: usize = conn.del(&keys).await?;
        tracing::debug!(pattern = %pattern, removed, "Cache keys deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_insight() {
        let key = CacheKey::Insight {
            session_id: "3f6c1d2e".to_string(),
            swipes: 7,
        };
        assert_eq!(format!("{}", key), "insight:3f6c1d2e:7");
    }

    #[test]
    fn test_cache_key_changes_with_ledger_length() {
        let before = CacheKey::Insight {
            session_id: "abc".to_string(),
            swipes: 4,
        };
        let after = CacheKey::Insight {
            session_id: "abc".to_string(),
            swipes: 5,
        };
        assert_ne!(format!("{}", before), format!("{}", after));
    }

    #[test]
    fn test_session_pattern_covers_insight_keys() {
        let key = CacheKey::Insight {
            session_id: "abc".to_string(),
            swipes: 9,
        };
        let pattern = CacheKey::session_pattern("abc");
        assert_eq!(pattern, "insight:abc:*");
        assert!(key.to_string().starts_with(pattern.trim_end_matches('*')));
    }

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_miss() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client).await;

        let key = CacheKey::Insight {
            session_id: "nonexistent_session_12345".to_string(),
            swipes: 0,
        };
        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_writer_graceful_shutdown() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client.clone()).await;

        let key = CacheKey::Insight {
            session_id: "test_shutdown".to_string(),
            swipes: 3,
        };
        let value = "You are craving something warm and spicy.".to_string();

        cache.set_in_background(&key, &value, 60);

        // Trigger graceful shutdown
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        // Clean up
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_delete_matching_drops_session_keys() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client).await;

        let key = CacheKey::Insight {
            session_id: "test_delete_matching".to_string(),
            swipes: 2,
        };
        cache.set_in_background(&key, &"stale".to_string(), 60);
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let removed = cache
            .delete_matching(&CacheKey::session_pattern("test_delete_matching"))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);
    }
}
