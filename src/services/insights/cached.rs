use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    services::insights::{NarrativeGenerator, TasteProfile},
};

const INSIGHT_CACHE_TTL: u64 = 86400; // 1 day

/// Caches another generator's output in Redis
///
/// The key includes the number of ledger entries, so a new swipe produces a
/// fresh insight while repeated stats calls reuse the stored one.
#[derive(Clone)]
pub struct CachedNarrator {
    inner: Arc<dyn NarrativeGenerator>,
    cache: Cache,
}

impl CachedNarrator {
    pub fn new(inner: Arc<dyn NarrativeGenerator>, cache: Cache) -> Self {
        Self { inner, cache }
    }

    fn key_for(profile: &TasteProfile) -> CacheKey {
        CacheKey::Insight {
            session_id: profile.session_id.clone(),
            swipes: profile.swipe_count(),
        }
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for CachedNarrator {
    async fn summarize(&self, profile: &TasteProfile) -> AppResult<String> {
        cached!(
            self.cache,
            Self::key_for(profile),
            INSIGHT_CACHE_TTL,
            async move { self.inner.summarize(profile).await }
        )
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn forget(&self, session_id: &str) -> AppResult<()> {
        // A reused session id must not inherit insights of the ended one
        let removed = self
            .cache
            .delete_matching(&CacheKey::session_pattern(session_id))
            .await?;
        tracing::debug!(session_id = %session_id, removed, "Cached insights dropped");

        self.inner.forget(session_id).await
    }
}
