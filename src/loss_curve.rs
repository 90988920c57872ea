//! Loss-curve rendering.
//!
//! Receives the ordered (iteration, loss) series produced by the parser and
//! renders it as an SVG line chart: y axis clamped to the loss region of
//! interest, major gridlines every 1.0 and minor every 0.5 by default.

use std::fs;
use std::path::Path;

use crate::entry::LogEntry;

/// Chart geometry and axis configuration.
#[derive(Debug, Clone)]
pub struct CurveConfig {
    /// Canvas width in pixels
    pub width: usize,
    /// Canvas height in pixels
    pub height: usize,
    /// Upper bound of the y axis; losses above it are clamped
    pub y_max: f64,
    /// Major y gridline and tick spacing
    pub y_major: f64,
    /// Minor y gridline spacing
    pub y_minor: f64,
    /// Optional chart title
    pub title: Option<String>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            y_max: 8.0,
            y_major: 1.0,
            y_minor: 0.5,
            title: None,
        }
    }
}

/// Error type for loss-curve rendering.
#[derive(Debug, thiserror::Error)]
pub enum CurveError {
    /// Nothing to plot
    #[error("no data points to plot")]
    Empty,
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const MARGIN_LEFT: usize = 60;
const MARGIN_RIGHT: usize = 20;
const MARGIN_TOP: usize = 40;
const MARGIN_BOTTOM: usize = 50;
const X_TICKS: usize = 5;

/// Ordered (iteration, loss) series with rendering configuration.
#[derive(Debug, Clone)]
pub struct LossCurve {
    iterations: Vec<u64>,
    losses: Vec<f64>,
    config: CurveConfig,
}

impl LossCurve {
    /// Build a curve from two equal-length ordered series.
    pub fn new(iterations: Vec<u64>, losses: Vec<f64>) -> Self {
        debug_assert_eq!(iterations.len(), losses.len());
        Self {
            iterations,
            losses,
            config: CurveConfig::default(),
        }
    }

    /// Build a curve from parsed entries, preserving their order.
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        Self::new(
            entries.iter().map(|e| e.iteration).collect(),
            entries.iter().map(|e| e.loss).collect(),
        )
    }

    pub fn with_config(mut self, config: CurveConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of data points in the series.
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Render the chart as an SVG document.
    pub fn render_svg(&self) -> Result<String, CurveError> {
        if self.iterations.is_empty() {
            return Err(CurveError::Empty);
        }

        let cfg = &self.config;
        let plot_w = cfg.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = cfg.height - MARGIN_TOP - MARGIN_BOTTOM;

        let x_min = *self.iterations.iter().min().unwrap_or(&0) as f64;
        let x_max = *self.iterations.iter().max().unwrap_or(&0) as f64;
        // Degenerate single-iteration domain still needs a non-zero span.
        let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };

        let x_pos = |iter: f64| MARGIN_LEFT as f64 + (iter - x_min) / x_span * plot_w as f64;
        let y_pos = |loss: f64| {
            let clamped = loss.clamp(0.0, cfg.y_max);
            MARGIN_TOP as f64 + (1.0 - clamped / cfg.y_max) * plot_h as f64
        };

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
            cfg.width, cfg.height
        );
        svg.push_str(&format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
            cfg.width, cfg.height
        ));

        if let Some(ref title) = cfg.title {
            svg.push_str(&format!(
                r#"<text x="{}" y="24" text-anchor="middle" font-size="14" font-weight="bold">{}</text>"#,
                cfg.width / 2,
                title
            ));
        }

        // Minor then major y gridlines, so major lines draw on top.
        let minor_steps = (cfg.y_max / cfg.y_minor).round() as usize;
        for i in 0..=minor_steps {
            let y = y_pos(i as f64 * cfg.y_minor);
            svg.push_str(&format!(
                r##"<line x1="{}" y1="{:.1}" x2="{}" y2="{:.1}" stroke="#eee" stroke-width="0.5"/>"##,
                MARGIN_LEFT,
                y,
                cfg.width - MARGIN_RIGHT,
                y
            ));
        }
        let major_steps = (cfg.y_max / cfg.y_major).round() as usize;
        for i in 0..=major_steps {
            let value = i as f64 * cfg.y_major;
            let y = y_pos(value);
            svg.push_str(&format!(
                r##"<line x1="{}" y1="{:.1}" x2="{}" y2="{:.1}" stroke="#ccc" stroke-width="1"/>"##,
                MARGIN_LEFT,
                y,
                cfg.width - MARGIN_RIGHT,
                y
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="10">{}</text>"#,
                MARGIN_LEFT - 6,
                y + 3.0,
                value
            ));
        }

        // X ticks at evenly spaced iteration values.
        for i in 0..=X_TICKS {
            let value = x_min + x_span * i as f64 / X_TICKS as f64;
            let x = x_pos(value);
            svg.push_str(&format!(
                r##"<line x1="{:.1}" y1="{}" x2="{:.1}" y2="{}" stroke="#ccc" stroke-width="1"/>"##,
                x,
                cfg.height - MARGIN_BOTTOM,
                x,
                cfg.height - MARGIN_BOTTOM + 5
            ));
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{}" text-anchor="middle" font-size="10">{}</text>"#,
                x,
                cfg.height - MARGIN_BOTTOM + 18,
                value.round() as i64
            ));
        }

        // Axis frame
        svg.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" stroke-width="1"/>"#,
            MARGIN_LEFT,
            MARGIN_TOP,
            MARGIN_LEFT,
            cfg.height - MARGIN_BOTTOM
        ));
        svg.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" stroke-width="1"/>"#,
            MARGIN_LEFT,
            cfg.height - MARGIN_BOTTOM,
            cfg.width - MARGIN_RIGHT,
            cfg.height - MARGIN_BOTTOM
        ));

        // The curve itself
        let points: Vec<String> = self
            .iterations
            .iter()
            .zip(&self.losses)
            .map(|(&iter, &loss)| format!("{:.1},{:.1}", x_pos(iter as f64), y_pos(loss)))
            .collect();
        svg.push_str(&format!(
            r##"<polyline points="{}" fill="none" stroke="#1f77b4" stroke-width="1.5"/>"##,
            points.join(" ")
        ));

        // Axis labels
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">Iteration</text>"#,
            MARGIN_LEFT + plot_w / 2,
            cfg.height - 12
        ));
        svg.push_str(&format!(
            r#"<text x="16" y="{}" text-anchor="middle" font-size="12" transform="rotate(-90 16 {})">Loss</text>"#,
            MARGIN_TOP + plot_h / 2,
            MARGIN_TOP + plot_h / 2
        ));

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Render the chart and write it to `path`.
    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<(), CurveError> {
        let svg = self.render_svg()?;
        fs::write(path, svg)?;
        Ok(())
    }
}
