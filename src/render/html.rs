//! Rich back-end: self-contained HTML with SVG gauges and sparklines.
//!
//! Compiled only with the `rich-html` feature. Without it the back-end
//! reports itself unavailable and the chain moves to the next one.

use super::{RenderError, RenderedDocument, ReportRenderer, ReportView};

const RENDERER_NAME: &str = "rich-html";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Default, Clone, Copy)]
pub struct RichHtmlRenderer;

impl RichHtmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for RichHtmlRenderer {
    fn name(&self) -> &'static str {
        RENDERER_NAME
    }

    fn render(&self, view: &ReportView) -> Result<RenderedDocument, RenderError> {
        let html = build_document(view)?;
        Ok(RenderedDocument {
            bytes: html.into_bytes(),
            content_type: HTML_CONTENT_TYPE,
            extension: "html",
            renderer: RENDERER_NAME,
        })
    }
}

#[cfg(not(feature = "rich-html"))]
fn build_document(_view: &ReportView) -> Result<String, RenderError> {
    Err(RenderError::Unavailable(RENDERER_NAME))
}

#[cfg(feature = "rich-html")]
fn build_document(view: &ReportView) -> Result<String, RenderError> {
    markup::document(view)
}

#[cfg(feature = "rich-html")]
mod markup {
    use std::fmt::Write;

    use super::super::geometry::{
        donut_dash, gauge_percent, sparkline_path, sparkline_points, status_color, DONUT_RADIUS,
        DONUT_SIZE, SPARK_HEIGHT, SPARK_WIDTH,
    };
    use super::super::{escape_html, MetricCard, RenderError, ReportView};
    use crate::models::GuidanceBundle;
    use crate::trends::{direction, last_change};

    const STYLE: &str = r#"
@page { size: A4; margin: 22mm; }
body { font-family: Inter, Arial, Helvetica, sans-serif; color: #0f172a; max-width: 960px; margin: 24px auto; padding: 0 16px; }
h1 { font-size: 22px; color: #166534; margin: 0 0 14px; }
h2 { font-size: 16px; margin: 22px 0 10px; }
.grid { display: grid; gap: 10px; grid-template-columns: repeat(3, 1fr); }
.card { border: 1px solid #e5e7eb; border-radius: 12px; padding: 12px; background: #fff; }
.row { display: flex; align-items: center; justify-content: space-between; }
.row2 { display: grid; grid-template-columns: 86px 1fr; gap: 10px; align-items: center; margin-top: 8px; }
.badge { font-size: 11px; padding: 2px 8px; border-radius: 12px; }
.badge-normal { background: #ecfdf5; color: #059669; }
.badge-alert { background: #fef2f2; color: #dc2626; }
.name { font-size: 13px; font-weight: 600; }
.normal, .change { font-size: 11px; color: #6b7280; margin-bottom: 6px; }
.change { margin: 4px 0 0; }
.bar-wrap { position: relative; height: 8px; background: #e5e7eb; border-radius: 999px; }
.bar-fill { position: absolute; inset: 0; background: rgba(34,197,94,0.18); border-radius: 999px; }
.marker { position: absolute; top: -3px; width: 2px; height: 14px; }
.section { margin-top: 18px; }
ul { margin: 6px 0 0 18px; padding: 0; }
li { margin: 2px 0; font-size: 12px; }
.note { color: #6b7280; font-size: 11px; margin-top: 4px; }
.muted { font-size: 12px; color: #475569; white-space: pre-wrap; }
.chip { font-size: 11px; padding: 2px 8px; border-radius: 12px; background: #f1f5f9; color: #475569; }
.advice { display: grid; grid-template-columns: 1fr 1fr; gap: 8px; }
"#;

    pub(super) fn document(view: &ReportView) -> Result<String, RenderError> {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str("<title>Health Report Summary</title>\n<style>");
        out.push_str(STYLE);
        out.push_str("</style>\n</head>\n<body>\n<h1>Health Report Summary</h1>\n");

        out.push_str("<h2>Health Metrics</h2>\n<div class=\"grid\">\n");
        for card in &view.cards {
            metric_card(&mut out, card)?;
        }
        out.push_str("</div>\n");

        out.push_str("<div class=\"section\">\n<h2>Suggestions</h2>\n");
        if view.guidance.is_empty() {
            out.push_str("<p class=\"muted\">No specific suggestions. Everything in range.</p>\n");
        } else {
            out.push_str("<div class=\"grid\">\n");
            for (metric, bundle) in &view.guidance {
                guidance_block(&mut out, metric, bundle)?;
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");

        summary_section(&mut out, "Doctor Summary", &view.doctor_summary)?;
        summary_section(&mut out, "Patient Summary", &view.patient_summary)?;

        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn ensure_finite(metric: &str, quantity: &'static str, value: f64) -> Result<f64, RenderError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(RenderError::NonFinite {
                metric: metric.to_string(),
                quantity,
            })
        }
    }

    fn metric_card(out: &mut String, card: &MetricCard) -> Result<(), RenderError> {
        let name = card.name.as_str();
        let value = ensure_finite(name, "value", card.value)?;
        ensure_finite(name, "band low", card.band.low)?;
        ensure_finite(name, "band high", card.band.high)?;
        let pct = ensure_finite(name, "gauge position", gauge_percent(value, &card.band))?;
        for &point in &card.series {
            ensure_finite(name, "trend point", point)?;
        }

        let color = status_color(card.status);
        let badge = if card.status.is_abnormal() { "badge-alert" } else { "badge-normal" };
        let unit = escape_html(&card.band.unit);
        let (dash, gap) = donut_dash(pct);
        let c = DONUT_SIZE / 2.0;
        let spark = sparkline_path(&sparkline_points(&card.series));

        write!(
            out,
            r##"<div class="card">
  <div class="row"><div class="name">{name}</div><span class="badge {badge}">{status}</span></div>
  <div class="row2">
    <svg width="{size}" height="{size}" viewBox="0 0 {size} {size}">
      <circle cx="{c}" cy="{c}" r="{r}" stroke="#e5e7eb" stroke-width="8" fill="none"/>
      <circle cx="{c}" cy="{c}" r="{r}" stroke="{color}" stroke-width="8" fill="none" stroke-dasharray="{dash:.2} {gap:.2}" transform="rotate(-90 {c} {c})"/>
      <text x="{c}" y="{ty}" text-anchor="middle" font-size="13" font-weight="700" fill="{color}">{value}</text>
      <text x="{c}" y="{uy}" text-anchor="middle" font-size="9" fill="#6b7280">{unit}</text>
    </svg>
    <div>
      <div class="normal">Normal: {range}</div>
      <div class="bar-wrap"><div class="bar-fill"></div><div class="marker" style="left: calc({pct:.2}% - 1px); background: {color}"></div></div>
      <svg width="{sw}" height="{sh}" viewBox="0 0 {sw} {sh}" style="margin-top:6px"><path d="{spark}" fill="none" stroke="{color}" stroke-width="2"/></svg>
"##,
            name = escape_html(name),
            range = escape_html(&card.band.display_range()),
            status = card.status.label(),
            size = DONUT_SIZE,
            r = DONUT_RADIUS,
            ty = c - 2.0,
            uy = c + 12.0,
            sw = SPARK_WIDTH,
            sh = SPARK_HEIGHT,
        )?;

        if let Some(delta) = last_change(&card.series) {
            writeln!(
                out,
                r#"      <div class="change">Last change: {delta:+.2} ({})</div>"#,
                direction(&card.series)
            )?;
        }
        out.push_str("    </div>\n  </div>\n</div>\n");
        Ok(())
    }

    fn guidance_block(out: &mut String, metric: &str, bundle: &GuidanceBundle) -> Result<(), RenderError> {
        write!(
            out,
            r#"<div class="card">
  <div class="row" style="margin-bottom:6px"><div class="name">{metric}</div><span class="chip">{status}</span></div>
  <div class="advice">
    <div><div class="name" style="font-size:12px">At home</div><ul>{home}</ul></div>
    <div><div class="name" style="font-size:12px">Medication / clinical</div><ul>{meds}</ul></div>
  </div>
  <div class="note">{note}</div>
</div>
"#,
            metric = escape_html(metric),
            status = bundle.status.label(),
            home = list_items(&bundle.home),
            meds = list_items(&bundle.meds),
            note = escape_html(&bundle.note),
        )?;
        Ok(())
    }

    fn summary_section(out: &mut String, heading: &str, text: &str) -> Result<(), RenderError> {
        writeln!(
            out,
            r#"<div class="section"><h2>{heading}</h2><div class="muted">{}</div></div>"#,
            escape_html(text)
        )?;
        Ok(())
    }

    fn list_items(items: &[String]) -> String {
        items
            .iter()
            .map(|item| format!("<li>{}</li>", escape_html(item)))
            .collect()
    }
}
