//! Report rendering with ordered back-end fallback.
//!
//! Back-ends present what the pipeline already decided. They never resolve
//! bands, classify or build guidance themselves.

pub mod geometry;
pub mod html;
pub mod pdf;

pub use html::RichHtmlRenderer;
pub use pdf::TabularPdfRenderer;

use serde::Serialize;

use crate::models::{
    AbnormalStatus, BandMap, GuidanceMap, MetricSet, ReferenceBand, StatusMap, TrendSeries,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Renderer '{0}' is not available in this build")]
    Unavailable(&'static str),

    #[error("Non-finite {quantity} for metric '{metric}'")]
    NonFinite { metric: String, quantity: &'static str },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("No render back-ends configured")]
    NoBackends,

    #[error("All render back-ends failed: {}", describe_failures(.0))]
    AllBackendsFailed(Vec<(String, String)>),
}

fn describe_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(name, msg)| format!("{name}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One metric as shown on a card or table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub name: String,
    pub value: f64,
    pub band: ReferenceBand,
    pub status: AbnormalStatus,
    /// Recent values, oldest first. Under two points means no trend.
    pub series: Vec<f64>,
}

/// Everything a back-end needs to draw a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportView {
    pub cards: Vec<MetricCard>,
    pub guidance: GuidanceMap,
    pub doctor_summary: String,
    pub patient_summary: String,
}

impl ReportView {
    /// Assemble the view. Metrics without a band or status get no card.
    pub fn assemble(
        metrics: &MetricSet,
        bands: &BandMap,
        statuses: &StatusMap,
        guidance: &GuidanceMap,
        trends: &TrendSeries,
        doctor_summary: &str,
        patient_summary: &str,
    ) -> Self {
        let cards = metrics
            .iter()
            .filter_map(|(name, &value)| {
                Some(MetricCard {
                    name: name.clone(),
                    value,
                    band: bands.get(name)?.clone(),
                    status: *statuses.get(name)?,
                    series: trends.get(name).cloned().unwrap_or_default(),
                })
            })
            .collect();

        Self {
            cards,
            guidance: guidance.clone(),
            doctor_summary: doctor_summary.to_string(),
            patient_summary: patient_summary.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Back-ends
// ---------------------------------------------------------------------------

/// A finished document and how to deliver it.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
    /// Name of the back-end that produced it.
    pub renderer: &'static str,
}

pub trait ReportRenderer: Send + Sync {
    fn name(&self) -> &'static str;
    fn render(&self, view: &ReportView) -> Result<RenderedDocument, RenderError>;
}

/// Ordered back-ends; the first success wins.
pub struct RenderChain {
    renderers: Vec<Box<dyn ReportRenderer>>,
}

impl Default for RenderChain {
    fn default() -> Self {
        Self::default_chain()
    }
}

impl RenderChain {
    pub fn new(renderers: Vec<Box<dyn ReportRenderer>>) -> Self {
        Self { renderers }
    }

    /// Rich HTML first, tabular PDF as fallback.
    pub fn default_chain() -> Self {
        Self::new(vec![
            Box::new(RichHtmlRenderer::new()),
            Box::new(TabularPdfRenderer::new()),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    pub fn render(&self, view: &ReportView) -> Result<RenderedDocument, RenderError> {
        if self.renderers.is_empty() {
            return Err(RenderError::NoBackends);
        }

        let mut failures = Vec::new();
        for renderer in &self.renderers {
            match renderer.render(view) {
                Ok(doc) => {
                    tracing::info!(
                        renderer = renderer.name(),
                        bytes = doc.bytes.len(),
                        fallbacks = failures.len(),
                        "Report rendered"
                    );
                    return Ok(doc);
                }
                Err(e) => {
                    tracing::warn!(renderer = renderer.name(), error = %e, "Renderer failed, trying next");
                    failures.push((renderer.name().to_string(), e.to_string()));
                }
            }
        }

        Err(RenderError::AllBackendsFailed(failures))
    }
}

/// Render-safe text: the original string, HTML-escaped.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::guidance::GuidanceEngine;

    /// Hemoglobin low with history, WBC normal without.
    pub(crate) fn sample_view() -> ReportView {
        let metrics = MetricSet::from([("Hemoglobin".to_string(), 9.5), ("WBC".to_string(), 7.0)]);
        let bands = BandMap::from([
            ("Hemoglobin".to_string(), ReferenceBand::new(13.0, 17.0, "g/dL")),
            ("WBC".to_string(), ReferenceBand::new(4.0, 11.0, "10^3/µL")),
        ]);
        let statuses = StatusMap::from([
            ("Hemoglobin".to_string(), AbnormalStatus::Low),
            ("WBC".to_string(), AbnormalStatus::Normal),
        ]);
        let guidance = GuidanceEngine::default().advise(&metrics, &bands);
        let trends = TrendSeries::from([
            ("Hemoglobin".to_string(), vec![11.0, 10.2, 9.5]),
            ("WBC".to_string(), vec![]),
        ]);
        ReportView::assemble(
            &metrics,
            &bands,
            &statuses,
            &guidance,
            &trends,
            "Microcytic picture <check ferritin>",
            "Your iron looks low & needs a follow-up",
        )
    }

    struct Failing;

    impl ReportRenderer for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn render(&self, _view: &ReportView) -> Result<RenderedDocument, RenderError> {
            Err(RenderError::Unavailable("failing"))
        }
    }

    #[test]
    fn assemble_skips_metrics_without_band() {
        let metrics = MetricSet::from([("Ferritin".to_string(), 12.0)]);
        let view = ReportView::assemble(
            &metrics,
            &BandMap::new(),
            &StatusMap::new(),
            &GuidanceMap::new(),
            &TrendSeries::new(),
            "",
            "",
        );
        assert!(view.cards.is_empty());
    }

    #[test]
    fn assemble_carries_series_and_status() {
        let view = sample_view();
        assert_eq!(view.cards.len(), 2);
        assert_eq!(view.cards[0].name, "Hemoglobin");
        assert_eq!(view.cards[0].series.len(), 3);
        assert_eq!(view.cards[1].status, AbnormalStatus::Normal);
        assert_eq!(view.guidance.len(), 1);
    }

    #[test]
    fn falls_back_when_primary_fails() {
        let chain = RenderChain::new(vec![Box::new(Failing), Box::new(TabularPdfRenderer::new())]);
        let doc = chain.render(&sample_view()).unwrap();
        assert_eq!(doc.renderer, "tabular-pdf");
        assert_eq!(doc.content_type, "application/pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn all_failures_are_aggregated() {
        let chain = RenderChain::new(vec![Box::new(Failing), Box::new(Failing)]);
        match chain.render(&sample_view()) {
            Err(RenderError::AllBackendsFailed(failures)) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].0, "failing");
            }
            other => panic!("expected AllBackendsFailed, got {other:?}"),
        }
    }

    #[test]
    fn empty_chain_is_an_error() {
        assert!(matches!(
            RenderChain::new(vec![]).render(&sample_view()),
            Err(RenderError::NoBackends)
        ));
    }

    #[test]
    fn default_chain_order() {
        assert_eq!(RenderChain::default_chain().names(), vec!["rich-html", "tabular-pdf"]);
    }

    #[cfg(feature = "rich-html")]
    #[test]
    fn default_chain_prefers_html() {
        let doc = RenderChain::default_chain().render(&sample_view()).unwrap();
        assert_eq!(doc.renderer, "rich-html");
        assert_eq!(doc.extension, "html");
    }

    #[cfg(not(feature = "rich-html"))]
    #[test]
    fn default_chain_without_html_feature_uses_pdf() {
        let doc = RenderChain::default_chain().render(&sample_view()).unwrap();
        assert_eq!(doc.renderer, "tabular-pdf");
    }

    #[test]
    fn escape_html_special_chars() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }
}
