//! Reference range resolution.
//!
//! Priority chain, first valid candidate wins:
//! supplied band → static table → external lookup → synthesized band.
//! Every band leaving this module satisfies `high > low`.

pub mod lookup;
pub mod table;

pub use lookup::{
    parse_range_text, CachedLookup, HttpRangeLookup, LookupCache, LookupError, MockRangeLookup,
    RangeLookup,
};
pub use table::{lookup_reference_range, normalize_metric_name, static_reference_ranges};

use serde::{Deserialize, Serialize};

use crate::models::{BandMap, BandSource, MetricSet, ReferenceBand, SourceMap, SuppliedBand, SuppliedBands};

/// A finalized band and the source that supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBand {
    pub band: ReferenceBand,
    pub source: BandSource,
}

pub struct RangeResolver {
    external: Option<Box<dyn RangeLookup>>,
}

impl Default for RangeResolver {
    fn default() -> Self {
        Self::offline()
    }
}

impl RangeResolver {
    /// Resolver without an external lookup step.
    pub fn offline() -> Self {
        Self { external: None }
    }

    pub fn with_lookup(lookup: Box<dyn RangeLookup>) -> Self {
        Self {
            external: Some(lookup),
        }
    }

    pub fn has_external_lookup(&self) -> bool {
        self.external.is_some()
    }

    /// Resolve one metric's band.
    ///
    /// Never fails: lookup errors are logged and the chain moves on. `value`
    /// must be finite for the synthesized step to hold its invariant.
    pub fn resolve(&self, metric: &str, value: f64, supplied: Option<&SuppliedBand>) -> ResolvedBand {
        if let Some(band) = supplied.and_then(SuppliedBand::validated) {
            return ResolvedBand {
                band,
                source: BandSource::Supplied,
            };
        }
        if supplied.is_some() {
            tracing::debug!(metric, "Supplied band rejected");
        }

        if let Some(band) = lookup_reference_range(metric) {
            return ResolvedBand {
                band,
                source: BandSource::ReferenceTable,
            };
        }

        if let Some(external) = &self.external {
            match external.lookup(metric) {
                Ok(band) if band.is_valid() => {
                    return ResolvedBand {
                        band,
                        source: BandSource::ExternalLookup,
                    };
                }
                Ok(_) => tracing::warn!(metric, "External lookup returned an invalid band"),
                Err(e) => tracing::warn!(metric, error = %e, "External range lookup failed"),
            }
        }

        ResolvedBand {
            band: synthesize_band(value),
            source: BandSource::Synthesized,
        }
    }

    /// Resolve every metric. Metrics with non-finite values are skipped.
    pub fn resolve_all(&self, metrics: &MetricSet, supplied: &SuppliedBands) -> (BandMap, SourceMap) {
        let mut bands = BandMap::new();
        let mut sources = SourceMap::new();

        for (name, &value) in metrics {
            if !value.is_finite() {
                tracing::debug!(metric = %name, "Dropping non-finite metric value");
                continue;
            }
            let resolved = self.resolve(name, value, supplied.get(name));
            tracing::debug!(metric = %name, source = %resolved.source, "Band resolved");
            bands.insert(name.clone(), resolved.band);
            sources.insert(name.clone(), resolved.source);
        }

        (bands, sources)
    }
}

/// Band centered on the observed value: `[v*0.8, v*1.2]`, ordered so
/// negative values still give `high > low`. Zero becomes `[-1, 1]`.
/// Near the edge of `f64` the outer bound saturates at `f64::MAX` (or `MIN`).
pub fn synthesize_band(value: f64) -> ReferenceBand {
    let a = value * 0.8;
    let b = (value * 1.2).clamp(f64::MIN, f64::MAX);
    let (low, high) = (a.min(b), a.max(b));
    if high > low {
        ReferenceBand::new(low, high, "")
    } else {
        ReferenceBand::new(value - 1.0, value + 1.0, "")
    }
}
