//! TTL-cached model catalog with single-flight refresh.
//!
//! The catalog is the one piece of process-wide mutable state in the
//! system. Reads against a fresh cache take only the read lock; a stale
//! cache triggers a refresh behind a mutex guarding the refresh path
//! alone, so concurrent refresh requests coalesce into a single upstream
//! fetch instead of a stampede.
//!
//! The clock is injectable, so staleness is testable without sleeping.

use super::client::OpenRouterClient;
use async_trait::async_trait;
use council_application::{CatalogError, ModelCatalog, ModelInfo};
use council_domain::ModelId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// The model listing changes rarely; five minutes is plenty fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Time source, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Source of catalog data; implemented by the gateway client.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ModelInfo>, CatalogError>;
}

#[async_trait]
impl CatalogFetcher for OpenRouterClient {
    async fn fetch(&self) -> Result<Vec<ModelInfo>, CatalogError> {
        self.fetch_models().await
    }
}

// Lets the catalog share a client already wrapped for the query fan-out
#[async_trait]
impl<F: CatalogFetcher + ?Sized> CatalogFetcher for Arc<F> {
    async fn fetch(&self) -> Result<Vec<ModelInfo>, CatalogError> {
        (**self).fetch().await
    }
}

#[derive(Default)]
struct CacheState {
    models: Vec<ModelInfo>,
    ids: HashSet<ModelId>,
    fetched_at: Option<Instant>,
}

/// Caching `ModelCatalog` adapter.
///
/// Pass the instance explicitly to whatever validates model ids — there
/// is deliberately no process-wide singleton.
pub struct CachingModelCatalog<F: CatalogFetcher> {
    fetcher: F,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: RwLock<CacheState>,
    /// Guards the refresh path only, never reads of a fresh cache
    refresh_guard: Mutex<()>,
}

impl<F: CatalogFetcher> CachingModelCatalog<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            clock: Arc::new(SystemClock),
            ttl: CACHE_TTL,
            state: RwLock::new(CacheState::default()),
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn is_fresh(&self, state: &CacheState) -> bool {
        match state.fetched_at {
            Some(fetched_at) => self.clock.now().duration_since(fetched_at) <= self.ttl,
            None => false,
        }
    }

    /// Refresh the cache if stale. Concurrent callers coalesce: the
    /// first takes the guard and fetches; the rest wait, re-check
    /// freshness, and find the work already done.
    async fn ensure_fresh(&self) -> Result<(), CatalogError> {
        {
            let state = self.state.read().await;
            if self.is_fresh(&state) {
                return Ok(());
            }
        }

        let _guard = self.refresh_guard.lock().await;

        {
            let state = self.state.read().await;
            if self.is_fresh(&state) {
                debug!("Catalog refreshed by a concurrent caller");
                return Ok(());
            }
        }

        let models = self.fetcher.fetch().await?;
        info!("Model catalog refreshed: {} models", models.len());

        let mut state = self.state.write().await;
        state.ids = models.iter().map(|m| m.id.clone()).collect();
        state.models = models;
        state.fetched_at = Some(self.clock.now());
        Ok(())
    }
}

#[async_trait]
impl<F: CatalogFetcher> ModelCatalog for CachingModelCatalog<F> {
    async fn lookup(&self, model: &ModelId) -> Result<bool, CatalogError> {
        self.ensure_fresh().await?;
        let state = self.state.read().await;
        Ok(state.ids.contains(model))
    }

    async fn models(&self) -> Result<Vec<ModelInfo>, CatalogError> {
        self.ensure_fresh().await?;
        let state = self.state.read().await;
        Ok(state.models.clone())
    }
}
