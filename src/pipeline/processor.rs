//! Report pipeline orchestrator.
//!
//! One report, one synchronous pass:
//! extract → resolve → classify → advise → trends → summarize → render.
//!
//! Collaborators (range lookup, summarizer, render back-ends) are injected
//! behind traits so the orchestrator runs fully offline in tests.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::classify::classify_all;
use crate::config::PipelineSettings;
use crate::guidance::GuidanceEngine;
use crate::models::{
    Audience, BandMap, GuidanceMap, HistorySnapshot, MetricSet, ReportMetadata, SourceMap,
    StatusMap, SuppliedBands, TrendSeries,
};
use crate::pipeline::extraction::extract;
use crate::ranges::{CachedLookup, HttpRangeLookup, RangeResolver};
use crate::render::{RenderChain, RenderError, RenderedDocument, ReportView};
use crate::summary::{summarize_or_placeholder, DisabledSummarizer, OllamaSummarizer, Summarizer};
use crate::trends;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The only failures a pipeline caller can observe.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// One report to process.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub text: String,
    pub supplied_bands: SuppliedBands,
    /// Past snapshots, oldest first.
    pub history: Vec<HistorySnapshot>,
}

impl ReportRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_supplied_bands(mut self, bands: SuppliedBands) -> Self {
        self.supplied_bands = bands;
        self
    }

    pub fn with_history(mut self, history: Vec<HistorySnapshot>) -> Self {
        self.history = history;
        self
    }
}

/// Everything decided about a report before rendering.
///
/// Every metric in `metrics` has a band, a source and a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportAnalysis {
    pub metrics: MetricSet,
    pub bands: BandMap,
    pub band_sources: SourceMap,
    pub statuses: StatusMap,
    pub guidance: GuidanceMap,
    pub trends: TrendSeries,
}

/// A rendered report with a unique identity.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub render_id: Uuid,
    pub analysis: ReportAnalysis,
    pub doctor_summary: String,
    pub patient_summary: String,
    pub document: RenderedDocument,
}

impl ReportOutcome {
    /// `health_summary_<render_id>.<ext>`, never shared between renders.
    pub fn file_name(&self) -> String {
        format!("health_summary_{}.{}", self.render_id, self.document.extension)
    }

    /// Write the document into `dir` (created if missing) and return its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.document.bytes)?;
        tracing::info!(path = %path.display(), "Report written");
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct ReportPipeline {
    resolver: RangeResolver,
    guidance: GuidanceEngine,
    renderers: RenderChain,
    summarizer: Box<dyn Summarizer>,
}

impl ReportPipeline {
    pub fn new(
        resolver: RangeResolver,
        guidance: GuidanceEngine,
        renderers: RenderChain,
        summarizer: Box<dyn Summarizer>,
    ) -> Self {
        Self {
            resolver,
            guidance,
            renderers,
            summarizer,
        }
    }

    /// Production wiring from settings.
    ///
    /// A collaborator whose client cannot be built is left out with a
    /// warning; the pipeline itself always constructs.
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        let resolver = match &settings.range_lookup_url {
            Some(url) => match HttpRangeLookup::new(url, settings.range_lookup_timeout_secs) {
                Ok(lookup) => RangeResolver::with_lookup(Box::new(CachedLookup::new(lookup))),
                Err(e) => {
                    tracing::warn!(error = %e, "Range lookup disabled");
                    RangeResolver::offline()
                }
            },
            None => RangeResolver::offline(),
        };

        let summarizer: Box<dyn Summarizer> = match OllamaSummarizer::new(
            &settings.ollama_url,
            &settings.ollama_model,
            settings.summary_timeout_secs,
        ) {
            Ok(s) => Box::new(s),
            Err(e) => {
                tracing::warn!(error = %e, "Summaries disabled");
                Box::new(DisabledSummarizer)
            }
        };

        Self::new(
            resolver,
            GuidanceEngine::default(),
            RenderChain::default_chain(),
            summarizer,
        )
    }

    /// Extract and analyze report text without rendering.
    pub fn analyze(
        &self,
        text: &str,
        supplied_bands: &SuppliedBands,
        history: &[HistorySnapshot],
    ) -> ReportAnalysis {
        let metrics = extract(text);
        tracing::info!(
            text_length = text.len(),
            metrics = metrics.len(),
            "Metrics extracted"
        );
        self.analyze_metrics(metrics, supplied_bands, history)
    }

    /// Analyze already-known metric values.
    pub fn analyze_metrics(
        &self,
        metrics: MetricSet,
        supplied_bands: &SuppliedBands,
        history: &[HistorySnapshot],
    ) -> ReportAnalysis {
        let (bands, band_sources) = self.resolver.resolve_all(&metrics, supplied_bands);

        // Metrics that could not be banded are dropped from every later stage.
        let metrics: MetricSet = metrics
            .into_iter()
            .filter(|(name, _)| bands.contains_key(name))
            .collect();

        let statuses = classify_all(&metrics, &bands);
        let guidance = self.guidance.advise(&metrics, &bands);
        let trends = trends::build(history, metrics.keys().map(String::as_str));

        tracing::info!(
            metrics = metrics.len(),
            abnormal = guidance.len(),
            "Report analyzed"
        );

        ReportAnalysis {
            metrics,
            bands,
            band_sources,
            statuses,
            guidance,
            trends,
        }
    }

    /// Full run: analyze, summarize for both audiences, render.
    pub fn run(&self, request: &ReportRequest) -> Result<ReportOutcome, PipelineError> {
        let render_id = Uuid::new_v4();
        let span = tracing::info_span!("report_pipeline", render_id = %render_id);
        let _guard = span.enter();

        let analysis = self.analyze(&request.text, &request.supplied_bands, &request.history);
        let doctor_summary =
            summarize_or_placeholder(self.summarizer.as_ref(), &request.text, Audience::Doctor);
        let patient_summary =
            summarize_or_placeholder(self.summarizer.as_ref(), &request.text, Audience::Patient);

        self.finish(render_id, analysis, doctor_summary, patient_summary)
    }

    /// Re-render a stored report from its normalized metadata and saved
    /// summaries. No oracle call is made.
    pub fn render_stored(
        &self,
        metadata: &ReportMetadata,
        doctor_summary: &str,
        patient_summary: &str,
        history: &[HistorySnapshot],
    ) -> Result<ReportOutcome, PipelineError> {
        let render_id = Uuid::new_v4();
        let span = tracing::info_span!("report_pipeline", render_id = %render_id, stored = true);
        let _guard = span.enter();

        let analysis =
            self.analyze_metrics(metadata.metrics.clone(), &metadata.supplied_bands, history);
        self.finish(
            render_id,
            analysis,
            doctor_summary.to_string(),
            patient_summary.to_string(),
        )
    }

    fn finish(
        &self,
        render_id: Uuid,
        analysis: ReportAnalysis,
        doctor_summary: String,
        patient_summary: String,
    ) -> Result<ReportOutcome, PipelineError> {
        let view = ReportView::assemble(
            &analysis.metrics,
            &analysis.bands,
            &analysis.statuses,
            &analysis.guidance,
            &analysis.trends,
            &doctor_summary,
            &patient_summary,
        );
        let document = self.renderers.render(&view)?;

        Ok(ReportOutcome {
            render_id,
            analysis,
            doctor_summary,
            patient_summary,
            document,
        })
    }
}
