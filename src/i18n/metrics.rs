//! Locale metrics and observability module.
//!
//! Tracks how lookups resolve (direct hit, fallback, placeholder) and how
//! often cache artifacts have to be rebuilt.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global locale metrics singleton.
pub struct LocaleMetrics {
    /// Lookups answered by the active language
    found: AtomicUsize,

    /// Lookups answered by the fallback language
    fallback_used: AtomicUsize,

    /// Lookups that produced a placeholder
    missing: AtomicUsize,

    /// Cache artifacts loaded from disk
    cache_hits: AtomicUsize,

    /// Cache artifacts that were absent or unreadable
    cache_misses: AtomicUsize,

    /// Cache artifacts written
    cache_builds: AtomicUsize,
}

static METRICS: OnceLock<LocaleMetrics> = OnceLock::new();

impl LocaleMetrics {
    /// Get the global locale metrics instance.
    pub fn global() -> &'static LocaleMetrics {
        METRICS.get_or_init(LocaleMetrics::new)
    }

    fn new() -> Self {
        LocaleMetrics {
            found: AtomicUsize::new(0),
            fallback_used: AtomicUsize::new(0),
            missing: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            cache_builds: AtomicUsize::new(0),
        }
    }

    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallback_used.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing(&self) {
        self.missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_build(&self) {
        self.cache_builds.fetch_add(1, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let found = self.found.load(Ordering::Relaxed);
        let fallback_used = self.fallback_used.load(Ordering::Relaxed);
        let missing = self.missing.load(Ordering::Relaxed);
        let total_lookups = found + fallback_used + missing;
        let missing_rate = if total_lookups > 0 {
            (missing as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total_loads = hits + misses;
        let cache_hit_rate = if total_loads > 0 {
            (hits as f64 / total_loads as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            found,
            fallback_used,
            missing,
            missing_rate,
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            cache_builds: self.cache_builds.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of the locale counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub found: usize,
    pub fallback_used: usize,
    pub missing: usize,

    /// Share of lookups that produced a placeholder, as a percentage (0-100)
    pub missing_rate: f64,

    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub cache_builds: usize,
}
