//! Best-effort external reference-range lookup.
//!
//! The lookup is a network collaborator: any failure (connection, timeout,
//! bad status, unparseable body) is "no answer" to the resolver. Successful
//! answers are kept in a [`LookupCache`] owned by the lookup for the process
//! lifetime.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};
use std::time::Duration;

use regex::Regex;

use crate::models::ReferenceBand;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Reference lookup service unreachable at {0}")]
    Connection(String),

    #[error("Reference lookup timed out after {0}s")]
    Timeout(u64),

    #[error("Reference lookup returned status {0}")]
    Status(u16),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("No usable range found for '{0}'")]
    NoRange(String),
}

/// Source of reference bands outside the static table.
pub trait RangeLookup: Send + Sync {
    fn lookup(&self, metric: &str) -> Result<ReferenceBand, LookupError>;
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Process-lifetime cache of successful lookups, keyed by lowercase metric.
///
/// Concurrent first lookups for the same metric may both fetch; the last
/// insert wins. Failures are never cached.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: RwLock<HashMap<String, ReferenceBand>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: &str) -> Option<ReferenceBand> {
        self.entries.read().ok()?.get(&cache_key(metric)).cloned()
    }

    pub fn insert(&self, metric: &str, band: ReferenceBand) {
        // A poisoned lock only means another writer panicked mid-insert;
        // the map itself is still a valid HashMap.
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(cache_key(metric), band);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(metric: &str) -> String {
    metric.trim().to_lowercase()
}

/// Wraps a lookup with a [`LookupCache`].
pub struct CachedLookup<L: RangeLookup> {
    inner: L,
    cache: LookupCache,
}

impl<L: RangeLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self::with_cache(inner, LookupCache::new())
    }

    pub fn with_cache(inner: L, cache: LookupCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }
}

impl<L: RangeLookup> RangeLookup for CachedLookup<L> {
    fn lookup(&self, metric: &str) -> Result<ReferenceBand, LookupError> {
        if let Some(hit) = self.cache.get(metric) {
            tracing::debug!(metric, "Reference lookup cache hit");
            return Ok(hit);
        }
        let band = self.inner.lookup(metric)?;
        self.cache.insert(metric, band.clone());
        Ok(band)
    }
}

// ---------------------------------------------------------------------------
// HTTP lookup
// ---------------------------------------------------------------------------

/// Queries a search/reference endpoint and parses the first range it finds.
pub struct HttpRangeLookup {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpRangeLookup {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("health-trail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RangeLookup for HttpRangeLookup {
    fn lookup(&self, metric: &str) -> Result<ReferenceBand, LookupError> {
        let query = format!("{} normal reference range", metric.trim());
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str())])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LookupError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LookupError::Timeout(self.timeout_secs)
                } else {
                    LookupError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| LookupError::HttpClient(e.to_string()))?;

        parse_range_text(&body).ok_or_else(|| LookupError::NoRange(metric.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script.*?</script>|<style.*?</style>|<[^>]+>")
        .expect("Invalid markup regex pattern")
});

static RANGE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(?:-|–|—|to)\s*(\d+(?:\.\d+)?)(?:\s*([a-zµ%][a-z0-9µ%/^.]*))?",
    )
    .expect("Invalid range regex pattern")
});

/// Extract the first valid `low - high [unit]` pair from text or HTML.
pub fn parse_range_text(body: &str) -> Option<ReferenceBand> {
    let text = MARKUP.replace_all(body, " ");
    RANGE_PAIR.captures_iter(&text).find_map(|caps| {
        let low: f64 = caps.get(1)?.as_str().parse().ok()?;
        let high: f64 = caps.get(2)?.as_str().parse().ok()?;
        let unit = caps
            .get(3)
            .map(|m| m.as_str().trim_end_matches('.'))
            .filter(|u| !is_filler_word(u))
            .unwrap_or_default();
        let band = ReferenceBand::new(low, high, unit);
        band.is_valid().then_some(band)
    })
}

/// Words that commonly follow a range in prose but are not units.
fn is_filler_word(word: &str) -> bool {
    matches!(
        word.to_lowercase().as_str(),
        "and" | "or" | "for" | "in" | "is" | "are" | "the" | "years" | "yrs" | "of"
    )
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Lookup returning canned answers; counts calls.
#[derive(Default)]
pub struct MockRangeLookup {
    answers: HashMap<String, ReferenceBand>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockRangeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, metric: &str, band: ReferenceBand) -> Self {
        self.answers.insert(cache_key(metric), band);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl RangeLookup for MockRangeLookup {
    fn lookup(&self, metric: &str) -> Result<ReferenceBand, LookupError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.answers
            .get(&cache_key(metric))
            .cloned()
            .ok_or_else(|| LookupError::NoRange(metric.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn parses_dash_range_with_unit() {
        let band = parse_range_text("Normal ferritin is 24 - 336 ng/mL for men").unwrap();
        assert_eq!(band, ReferenceBand::new(24.0, 336.0, "ng/mL"));
    }

    #[test]
    fn parses_to_range_inside_html() {
        let html = "<table><tr><td>Ferritin</td><td>24 to 336</td></tr></table>";
        let band = parse_range_text(html).unwrap();
        assert_eq!(band.low, 24.0);
        assert_eq!(band.high, 336.0);
        assert_eq!(band.unit, "");
    }

    #[test]
    fn parses_en_dash() {
        let band = parse_range_text("range: 0.5–1.5 mg/dL").unwrap();
        assert_eq!(band.low, 0.5);
        assert_eq!(band.unit, "mg/dL");
    }

    #[test]
    fn skips_inverted_pairs() {
        let band = parse_range_text("updated 2024-01 ... range 3.5 - 5.0 g/dL").unwrap();
        assert_eq!(band, ReferenceBand::new(3.5, 5.0, "g/dL"));
    }

    #[test]
    fn filler_word_is_not_a_unit() {
        let band = parse_range_text("between 70 to 99 and rising").unwrap();
        assert_eq!(band.unit, "");
    }

    #[test]
    fn no_range_in_body() {
        assert!(parse_range_text("<p>No data</p>").is_none());
        assert!(parse_range_text("").is_none());
    }

    #[test]
    fn cached_lookup_fetches_once() {
        let mock = MockRangeLookup::new().with_answer("Ferritin", ReferenceBand::new(24.0, 336.0, "ng/mL"));
        let cached = CachedLookup::new(mock);

        let first = cached.lookup("Ferritin").unwrap();
        let second = cached.lookup("  ferritin").unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.calls(), 1);
        assert_eq!(cached.cache().len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cached = CachedLookup::new(MockRangeLookup::new());
        assert!(cached.lookup("Ferritin").is_err());
        assert!(cached.lookup("Ferritin").is_err());
        assert_eq!(cached.inner.calls(), 2);
        assert!(cached.cache().is_empty());
    }

    #[test]
    fn concurrent_lookups_leave_consistent_cache() {
        let mock = MockRangeLookup::new().with_answer("Ferritin", ReferenceBand::new(24.0, 336.0, "ng/mL"));
        let cached = Arc::new(CachedLookup::new(mock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cached = Arc::clone(&cached);
                thread::spawn(move || cached.lookup("Ferritin").unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().high, 336.0);
        }
        assert_eq!(cached.cache().len(), 1);
        assert!(cached.inner.calls() >= 1);
    }

    #[test]
    fn http_lookup_trims_trailing_slash() {
        let lookup = HttpRangeLookup::new("http://localhost:9/ranges/", 1).unwrap();
        assert_eq!(lookup.base_url(), "http://localhost:9/ranges");
    }

    #[test]
    fn http_lookup_unreachable_is_an_error() {
        // Port 9 (discard) is not expected to serve HTTP.
        let lookup = HttpRangeLookup::new("http://127.0.0.1:9", 1).unwrap();
        assert!(lookup.lookup("Ferritin").is_err());
    }
}
