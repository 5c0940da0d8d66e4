//! Opt-in timing hooks for surface loading, conversion and interpolation.
//!
//! Timing is only collected when the `metrics` feature is enabled and the
//! target is not WASM. Otherwise every call compiles down to running the
//! closure and [`SurfaceMetrics::end`] returns `None`.
//!
//! # Usage
//!
//! ```ignore
//! use surface_transfer::{FieldKind, TransferContext};
//!
//! let mut ctx = TransferContext::new();
//! ctx.metrics.begin();
//! let q = surface.interpolate_with_context(FieldKind::Point, "q", &points, &markers, &mut ctx)?;
//! if let Some(report) = ctx.metrics.end() {
//!     log::info!("interpolation took {:.3} ms", report.total_ms());
//! }
//! ```

/// Categories for timing the phases of a field transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Triangle cache rebuild and derived field population.
    Preprocess,
    /// Cell/point field conversion.
    Conversion,
    /// Nearest-feature search and value reconstruction.
    Interpolation,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TimingReport {
    pub preprocess_ns: u64,
    pub conversion_ns: u64,
    pub interpolation_ns: u64,
}

impl TimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.preprocess_ns
            .saturating_add(self.conversion_ns)
            .saturating_add(self.interpolation_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing surface operations.
///
/// Call [`begin`](Self::begin) to reset, wrap work in [`time`](Self::time)
/// and read the totals with [`end`](Self::end).
#[derive(Debug, Default, Clone)]
pub struct SurfaceMetrics {
    #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
    report: TimingReport,
}

impl SurfaceMetrics {
    /// Resets all counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            self.report = TimingReport::default();
        }
    }

    /// Returns the accumulated report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<TimingReport> {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its wall time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            let slot = match bucket {
                TimingBucket::Preprocess => &mut self.report.preprocess_ns,
                TimingBucket::Conversion => &mut self.report.conversion_ns,
                TimingBucket::Interpolation => &mut self.report.interpolation_ns,
            };
            *slot = slot.saturating_add(nanos);
            log::debug!("{bucket:?} took {nanos} ns");
            result
        }

        #[cfg(not(all(feature = "metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
