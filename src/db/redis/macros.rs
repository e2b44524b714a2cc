/// Read-through caching around an async computation.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live and
/// returns it. A failed cache read is logged and treated as a miss, so an
/// unreachable Redis only costs the cache, never the result. Errors from
/// `$block` are propagated with `?`, so use it inside a function returning
/// `AppResult`. The expansion is an `Ok(..)`, so use it where the result type
/// is already known.
///
/// # Example
/// ```rust,ignore
/// async fn summarize(&self, profile: &TasteProfile) -> AppResult<String> {
///     cached!(self.cache, key, INSIGHT_CACHE_TTL, self.inner.summarize(profile))
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;

        // Try the cache first; a read failure falls through to the computation
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, computing value");
                None
            }
        };

        if let Some(hit) = hit {
            Ok(hit)
        } else {
            // Miss: compute, then write back without waiting on Redis
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
