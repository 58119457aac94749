//! TTL-bounded flag cache.
//!
//! All entries share one staleness timestamp: any remote refresh stamps it,
//! and once it is older than the TTL every entry is looked up again on its
//! next read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fit_core::clock::Clock;
use fit_core::entities::FeatureFlag;
use futures::future::join_all;
use tokio::sync::OnceCell;

use crate::source::FlagSource;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct CacheState {
    values: HashMap<String, bool>,
    refreshed_at: Option<DateTime<Utc>>,
    /// Bumped by every invalidation; lookups started earlier are not stored.
    generation: u64,
}

pub struct FlagCache<S> {
    source: S,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    preload: Vec<String>,
    state: Mutex<CacheState>,
    initialized: OnceCell<()>,
}

impl<S: FlagSource> FlagCache<S> {
    pub fn new(source: S, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1));
        Self {
            source,
            clock,
            ttl,
            preload: Vec::new(),
            state: Mutex::new(CacheState::default()),
            initialized: OnceCell::new(),
        }
    }

    /// Names looked up by [`Self::initialize`].
    #[must_use]
    pub fn with_preload(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.preload = names.into_iter().map(Into::into).collect();
        self
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Whether `name` is switched on.
    ///
    /// Missing flags read as off and are cached like any other value. A
    /// failed lookup also reads as off but is not cached, so the next call
    /// asks the source again.
    pub async fn is_enabled(&self, name: &str) -> bool {
        if let Some(enabled) = self.cached(name) {
            tracing::debug!(flag = name, enabled, "flag cache hit");
            return enabled;
        }

        tracing::debug!(flag = name, "flag cache miss");
        let generation = self.lock().generation;
        match self.source.fetch_flag(name).await {
            Ok(flag) => {
                let enabled = flag.is_some_and(|f| f.enabled);
                let now = self.clock.now();
                let mut state = self.lock();
                if state.generation == generation {
                    state.values.insert(name.to_string(), enabled);
                    state.refreshed_at = Some(now);
                } else {
                    tracing::debug!(flag = name, "cache invalidated during lookup, not storing");
                }
                enabled
            }
            Err(e) => {
                tracing::warn!(flag = name, error = %e, "flag lookup failed, treating as disabled");
                false
            }
        }
    }

    /// Write a flag value and drop its cached entry.
    ///
    /// # Errors
    ///
    /// Returns the source error; the cache is left untouched on failure.
    pub async fn update(
        &self,
        name: &str,
        enabled: bool,
        updated_by: Option<&str>,
    ) -> Result<(), S::Error> {
        self.source
            .set_flag_enabled(name, enabled, updated_by)
            .await?;
        let mut state = self.lock();
        state.values.remove(name);
        state.generation = state.generation.wrapping_add(1);
        Ok(())
    }

    /// Create a flag and clear the whole cache.
    ///
    /// # Errors
    ///
    /// Returns the source error; the cache is left untouched on failure.
    pub async fn create(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FeatureFlag, S::Error> {
        let flag = self.source.insert_flag(name, enabled, description).await?;
        self.clear_cache();
        Ok(flag)
    }

    pub fn clear_cache(&self) {
        let mut state = self.lock();
        state.values.clear();
        state.refreshed_at = None;
        state.generation = state.generation.wrapping_add(1);
    }

    /// Look up every preload name concurrently, once.
    ///
    /// Concurrent callers wait on the same run. Individual failures leave
    /// that flag disabled; initialization completes regardless.
    pub async fn initialize(&self) {
        self.initialized
            .get_or_init(|| async {
                let lookups = self.preload.iter().map(|name| self.is_enabled(name));
                let values = join_all(lookups).await;
                let enabled = values.iter().filter(|v| **v).count();
                tracing::info!(preloaded = values.len(), enabled, "feature flags initialized");
            })
            .await;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    fn cached(&self, name: &str) -> Option<bool> {
        let now = self.clock.now();
        let state = self.lock();
        let fresh = state
            .refreshed_at
            .is_some_and(|at| now.signed_duration_since(at) < self.ttl);
        if fresh {
            state.values.get(name).copied()
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;
    use fit_core::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    /// In-memory source that counts lookups and can be told to fail.
    #[derive(Default)]
    struct FakeSource {
        flags: Mutex<HashMap<String, bool>>,
        failing: HashSet<String>,
        lookups: AtomicUsize,
    }

    impl FakeSource {
        fn with(flags: &[(&str, bool)]) -> Self {
            Self {
                flags: Mutex::new(flags.iter().map(|(n, e)| ((*n).to_string(), *e)).collect()),
                ..Self::default()
            }
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        fn flag(name: &str, enabled: bool) -> FeatureFlag {
            FeatureFlag {
                name: name.to_string(),
                enabled,
                description: None,
                updated_at: Utc::now(),
                updated_by: None,
            }
        }
    }

    impl FlagSource for FakeSource {
        type Error = String;

        async fn fetch_flag(&self, name: &str) -> Result<Option<FeatureFlag>, String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            // Answer is read before the simulated round trip completes.
            let answer = if self.failing.contains(name) {
                Err(format!("backend down for {name}"))
            } else {
                let flags = self.flags.lock().unwrap();
                Ok(flags.get(name).map(|e| Self::flag(name, *e)))
            };
            tokio::task::yield_now().await;
            answer
        }

        async fn set_flag_enabled(
            &self,
            name: &str,
            enabled: bool,
            _updated_by: Option<&str>,
        ) -> Result<(), String> {
            let mut flags = self.flags.lock().unwrap();
            match flags.get_mut(name) {
                Some(value) => {
                    *value = enabled;
                    Ok(())
                }
                None => Err(format!("no flag {name}")),
            }
        }

        async fn insert_flag(
            &self,
            name: &str,
            enabled: bool,
            _description: Option<&str>,
        ) -> Result<FeatureFlag, String> {
            self.flags.lock().unwrap().insert(name.to_string(), enabled);
            Ok(Self::flag(name, enabled))
        }

        async fn list_flags(&self) -> Result<Vec<FeatureFlag>, String> {
            let flags = self.flags.lock().unwrap();
            Ok(flags.iter().map(|(n, e)| Self::flag(n, *e)).collect())
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()))
    }

    fn cache(source: FakeSource, clock: &Arc<ManualClock>) -> FlagCache<FakeSource> {
        FlagCache::new(source, clock.clone(), DEFAULT_TTL)
    }

    #[tokio::test]
    async fn single_lookup_within_ttl() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("logo_fetch", true)]), &clock);

        assert!(flags.is_enabled("logo_fetch").await);
        clock.advance(chrono::Duration::seconds(29));
        assert!(flags.is_enabled("logo_fetch").await);
        assert_eq!(flags.source().lookups(), 1);
    }

    #[tokio::test]
    async fn new_lookup_after_ttl() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("logo_fetch", true)]), &clock);

        assert!(flags.is_enabled("logo_fetch").await);
        clock.advance(chrono::Duration::seconds(31));
        assert!(flags.is_enabled("logo_fetch").await);
        assert_eq!(flags.source().lookups(), 2);
    }

    #[rstest]
    #[case(true, false)]
    #[case(false, true)]
    #[tokio::test]
    async fn update_invalidates_entry(#[case] before: bool, #[case] after: bool) {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("pdf_export", before)]), &clock);

        assert_eq!(flags.is_enabled("pdf_export").await, before);
        flags.update("pdf_export", after, Some("admin")).await.unwrap();
        assert_eq!(flags.is_enabled("pdf_export").await, after);
        assert_eq!(flags.source().lookups(), 2);
    }

    #[tokio::test]
    async fn lookup_in_flight_during_update_is_not_stored() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("pdf_export", true)]), &clock);

        let lookup = flags.is_enabled("pdf_export");
        tokio::pin!(lookup);
        assert!(futures::poll!(&mut lookup).is_pending());

        flags.update("pdf_export", false, Some("admin")).await.unwrap();
        assert!(lookup.await, "in-flight caller still sees its own answer");

        assert!(!flags.is_enabled("pdf_export").await);
        assert_eq!(flags.source().lookups(), 2);
    }

    #[tokio::test]
    async fn clear_during_lookup_discards_result() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("a", true)]), &clock);

        let lookup = flags.is_enabled("a");
        tokio::pin!(lookup);
        assert!(futures::poll!(&mut lookup).is_pending());
        flags.clear_cache();
        assert!(lookup.await);

        flags.is_enabled("a").await;
        assert_eq!(flags.source().lookups(), 2);
    }

    #[tokio::test]
    async fn failed_update_keeps_cache() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("pdf_export", true)]), &clock);
        assert!(flags.is_enabled("pdf_export").await);

        assert!(flags.update("ghost", false, None).await.is_err());
        assert!(flags.is_enabled("pdf_export").await);
        assert_eq!(flags.source().lookups(), 1);
    }

    #[tokio::test]
    async fn missing_flag_is_false_and_cached() {
        let clock = clock();
        let flags = cache(FakeSource::default(), &clock);

        assert!(!flags.is_enabled("unknown").await);
        assert!(!flags.is_enabled("unknown").await);
        assert_eq!(flags.source().lookups(), 1);
    }

    #[tokio::test]
    async fn lookup_error_is_false_and_not_cached() {
        let clock = clock();
        let flags = cache(FakeSource::default().failing_on("share_links"), &clock);

        assert!(!flags.is_enabled("share_links").await);
        assert!(!flags.is_enabled("share_links").await);
        assert_eq!(flags.source().lookups(), 2);
    }

    #[tokio::test]
    async fn create_clears_whole_cache() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("a", true), ("b", false)]), &clock);
        flags.is_enabled("a").await;
        flags.is_enabled("b").await;

        flags.create("c", true, Some("new")).await.unwrap();
        assert!(flags.is_enabled("c").await);
        flags.is_enabled("a").await;
        assert_eq!(flags.source().lookups(), 4);
    }

    #[tokio::test]
    async fn clear_cache_forces_lookup() {
        let clock = clock();
        let flags = cache(FakeSource::with(&[("a", true)]), &clock);
        flags.is_enabled("a").await;
        flags.clear_cache();
        flags.is_enabled("a").await;
        assert_eq!(flags.source().lookups(), 2);
    }

    #[tokio::test]
    async fn initialize_runs_once_for_concurrent_callers() {
        let clock = clock();
        let flags = cache(
            FakeSource::with(&[("logo_fetch", true), ("pdf_export", false)]),
            &clock,
        )
        .with_preload(["logo_fetch", "pdf_export", "email_capture"]);

        assert!(!flags.is_initialized());
        tokio::join!(flags.initialize(), flags.initialize());
        flags.initialize().await;

        assert!(flags.is_initialized());
        assert_eq!(flags.source().lookups(), 3);
        assert!(flags.is_enabled("logo_fetch").await);
        assert_eq!(flags.source().lookups(), 3);
    }

    #[tokio::test]
    async fn initialize_tolerates_failures() {
        let clock = clock();
        let flags = cache(
            FakeSource::with(&[("logo_fetch", true)]).failing_on("pdf_export"),
            &clock,
        )
        .with_preload(["logo_fetch", "pdf_export"]);

        flags.initialize().await;
        assert!(flags.is_initialized());
        assert!(flags.is_enabled("logo_fetch").await);
        assert!(!flags.is_enabled("pdf_export").await);
    }
}
