//! Concurrency limiter for mutation calls
//!
//! Semaphore-based bound on in-flight gateway calls. Permits are taken
//! around single leaf calls only, never around a whole group update, so
//! nested fan-out cannot deadlock on its own permits.

use progmerge_core::errors::{ExError, ExErrorKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::config::SaveConfig;

/// Permit count used when limiting is switched off
const UNBOUNDED_PERMITS: usize = 1_000_000;

/// Semaphore-based limiter shared by every task of one save
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_permits: usize,
    enabled: bool,
    calls_acquired: Arc<AtomicU64>,
    calls_waited: Arc<AtomicU64>,
}

impl ConcurrencyLimiter {
    pub fn new(config: &SaveConfig) -> Self {
        let max_permits = if config.limit_concurrency {
            config.max_concurrent_mutations.max(1)
        } else {
            UNBOUNDED_PERMITS
        };

        Self {
            semaphore: Arc::new(Semaphore::new(max_permits)),
            max_permits,
            enabled: config.limit_concurrency,
            calls_acquired: Arc::new(AtomicU64::new(0)),
            calls_waited: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Acquire a permit, waiting while at capacity.
    ///
    /// The permit is released when dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, ExError> {
        if self.enabled && self.semaphore.available_permits() == 0 {
            self.calls_waited.fetch_add(1, Ordering::Relaxed);
            debug!(
                in_use = self.max_permits,
                "Concurrency limiter: waiting for permit"
            );
        }

        let permit = self.semaphore.clone().acquire_owned().await.map_err(|e| {
            ExError::new(ExErrorKind::Concurrency)
                .with_op("acquire_permit")
                .with_message(e.to_string())
        })?;
        self.calls_acquired.fetch_add(1, Ordering::Relaxed);

        if self.enabled {
            debug!(
                in_use = self.max_permits - self.semaphore.available_permits(),
                max = self.max_permits,
                "Concurrency limiter: acquired permit"
            );
        }

        Ok(permit)
    }

    /// Try to acquire a permit without waiting
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        self.calls_acquired.fetch_add(1, Ordering::Relaxed);
        Some(permit)
    }

    pub fn available_permits(&self) -> usize {
        if !self.enabled {
            return usize::MAX;
        }
        self.semaphore.available_permits()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stats(&self) -> ConcurrencyStats {
        ConcurrencyStats {
            available_permits: self.available_permits(),
            max_permits: self.max_permits,
            calls_acquired: self.calls_acquired.load(Ordering::Relaxed),
            calls_waited: self.calls_waited.load(Ordering::Relaxed),
            enabled: self.enabled,
        }
    }
}

/// Limiter statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrencyStats {
    pub available_permits: usize,
    pub max_permits: usize,
    /// Total permits handed out
    pub calls_acquired: u64,
    /// Calls that found the limiter at capacity
    pub calls_waited: u64,
    pub enabled: bool,
}

impl ConcurrencyStats {
    /// Number of permits currently held
    pub fn in_use(&self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.max_permits.saturating_sub(self.available_permits)
    }
}
