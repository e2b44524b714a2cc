use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};

use crate::{
    db::SwipeStore,
    error::{AppError, AppResult},
};

/// Per-session lock state: `true` once the session has been ended
type Gate = Arc<Mutex<bool>>;

struct Entry {
    last_seen: Instant,
    gate: Gate,
}

impl Entry {
    fn new() -> Self {
        Self {
            last_seen: Instant::now(),
            gate: Arc::new(Mutex::new(false)),
        }
    }
}

/// Held while a call runs against a session
///
/// Dropping it lets the next queued call for the same session proceed.
pub type SessionGuard = OwnedMutexGuard<bool>;

/// Live sessions of this process
///
/// Every live session owns an async mutex that serialises engine calls on it.
/// Entries idle for longer than the TTL are dropped from the registry; their
/// stored state stays put and is picked up again on the next `acquire`.
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn SwipeStore>,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
}

/// Handle for stopping the eviction sweeper
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SweeperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Session sweeper shutdown signal sent");
    }
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SwipeStore>, ttl: Duration) -> Self {
        Self {
            store,
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers a session, creating its stored row if needed
    ///
    /// Opening a session that is already live just refreshes it.
    pub async fn open(&self, session_id: &str) -> AppResult<()> {
        if session_id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Session id must not be empty".to_string(),
            ));
        }

        // Create the stored session first so a revival can always find it
        self.store.create_session(session_id).await?;

        let mut entries = self.entries.lock().await;
        entries
            .entry(session_id.to_string())
            .and_modify(|e| e.last_seen = Instant::now())
            .or_insert_with(Entry::new);

        tracing::info!(session_id = %session_id, live = entries.len(), "Session opened");
        Ok(())
    }

    /// Waits for exclusive use of a session
    ///
    /// A session evicted from the registry but still present in the store is
    /// revived. Unknown sessions, and sessions ended while the call was queued,
    /// are `NotFound`.
    pub async fn acquire(&self, session_id: &str) -> AppResult<SessionGuard> {
        // Fast path: the session is live in this process
        let live = {
            let mut entries = self.entries.lock().await;
            entries.get_mut(session_id).map(|entry| {
                entry.last_seen = Instant::now();
                entry.gate.clone()
            })
        };

        let (gate, revived) = match live {
            Some(gate) => (gate, false),
            None => {
                // Ask the store without holding the registry lock
                if !self.store.session_exists(session_id).await? {
                    return Err(Self::not_found(session_id));
                }

                // Another call may have revived it in the meantime
                let mut entries = self.entries.lock().await;
                let entry = entries
                    .entry(session_id.to_string())
                    .or_insert_with(Entry::new);
                entry.last_seen = Instant::now();
                tracing::debug!(session_id = %session_id, "Reviving session");
                (entry.gate.clone(), true)
            }
        };

        let guard = gate.clone().lock_owned().await;

        // The session may have been ended while this call was queued
        if *guard {
            return Err(Self::not_found(session_id));
        }

        // An `end` that ran between the store check and the insert above left
        // a fresh entry behind for a deleted session
        if revived && !self.store.session_exists(session_id).await? {
            self.remove_entry(session_id, &gate).await;
            return Err(Self::not_found(session_id));
        }

        Ok(guard)
    }

    /// Ends a session and deletes everything stored for it
    ///
    /// Waits for any in-flight call on the session to finish first. Calls
    /// queued behind this one fail with `NotFound`.
    pub async fn end(&self, session_id: &str) -> AppResult<()> {
        let mut guard = self.acquire(session_id).await?;

        self.store.delete_session(session_id).await?;

        // Mark the gate before releasing it so queued calls see the end
        *guard = true;
        let gate = OwnedMutexGuard::mutex(&guard).clone();
        self.remove_entry(session_id, &gate).await;

        tracing::info!(session_id = %session_id, "Session ended");
        Ok(())
    }

    /// Removes the entry for `session_id` if it still owns `gate`
    async fn remove_entry(&self, session_id: &str, gate: &Gate) {
        let mut entries = self.entries.lock().await;
        if entries
            .get(session_id)
            .is_some_and(|entry| Arc::ptr_eq(&entry.gate, gate))
        {
            entries.remove(session_id);
        }
    }

    fn not_found(session_id: &str) -> AppError {
        AppError::NotFound(format!("Session {} not found", session_id))
    }

    /// Drops entries idle for longer than the TTL, returning how many went
    ///
    /// Entries with a call in flight are kept regardless of age.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| {
            // Held or queued-on gates carry extra references
            let busy = Arc::strong_count(&entry.gate) > 1;
            busy || now.duration_since(entry.last_seen) < self.ttl
        });
        let evicted = before - entries.len();

        if evicted > 0 {
            tracing::info!(evicted, live = entries.len(), "Evicted idle sessions");
        }
        evicted
    }

    #[cfg(test)]
    async fn live_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Spawns the background task that evicts idle sessions every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let registry = self.clone();

        // Spawn background task to evict idle sessions
        tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Session sweeper started");
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        registry.evict_expired().await;
                    }
                    _ = shutdown_rx.recv() => {
                        // Entries are in-memory only, nothing to flush
                        tracing::info!("Session sweeper stopped");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown_tx }
    }
}
