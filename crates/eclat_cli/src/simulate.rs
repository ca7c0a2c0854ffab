//! Headless scroll simulation
//!
//! Mounts a page, scrolls it linearly from the top to a target offset at a
//! fixed frame rate and keeps running frames until every reveal has settled.

use anyhow::{bail, Context, Result};
use eclat_core::Size;
use eclat_page::{FrameReport, PageConfig, PageRuntime};

/// Upper bound on frames spent waiting for reveals after the scroll ends
const MAX_SETTLE_FRAMES: u32 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct SimulationOptions {
    pub viewport: Size,
    /// Target offset; `None` scrolls to the bottom
    pub to: Option<f32>,
    pub duration_ms: u32,
    pub fps: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 800.0),
            to: None,
            duration_ms: 1200,
            fps: 60,
        }
    }
}

/// Outcome of a simulation run
#[derive(Debug)]
pub struct Simulation {
    pub document_height: f32,
    pub reports: Vec<FrameReport>,
    /// Reveals that never triggered
    pub pending: Vec<String>,
}

impl Simulation {
    pub fn triggered(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .flat_map(|report| report.triggered.iter().map(String::as_str))
    }

    pub fn final_report(&self) -> Option<&FrameReport> {
        self.reports.last()
    }
}

/// Parse `WIDTHxHEIGHT`, e.g. `1280x800`
pub fn parse_viewport(value: &str) -> Result<Size> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("viewport '{value}' must look like 1280x800"))?;
    let width: f32 = width
        .trim()
        .parse()
        .with_context(|| format!("invalid viewport width '{width}'"))?;
    let height: f32 = height
        .trim()
        .parse()
        .with_context(|| format!("invalid viewport height '{height}'"))?;
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        bail!("viewport '{value}' must have a positive width and height");
    }
    Ok(Size::new(width, height))
}

pub fn run(config: PageConfig, options: SimulationOptions) -> Result<Simulation> {
    if options.fps == 0 {
        bail!("fps must be positive");
    }

    let mut page =
        PageRuntime::mount(config, options.viewport).context("failed to mount page")?;
    let document_height = page.layout().document_height();
    let target = options
        .to
        .unwrap_or(document_height)
        .clamp(0.0, document_height);

    let dt_ms = 1000.0 / options.fps as f32;
    let scroll_frames = ((options.duration_ms as f32 / dt_ms).ceil() as u32).max(1);

    tracing::info!(
        to = target,
        document_height,
        frames = scroll_frames,
        "simulating scroll"
    );

    let mut reports = Vec::with_capacity(scroll_frames as usize);
    for frame in 1..=scroll_frames {
        let t = frame as f32 / scroll_frames as f32;
        page.scroll_to(target * t);
        reports.push(page.frame(dt_ms));
    }

    let mut settled = false;
    for _ in 0..MAX_SETTLE_FRAMES {
        let report = page.frame(dt_ms);
        let idle = report.is_idle();
        reports.push(report);
        if idle {
            settled = true;
            break;
        }
    }
    if !settled {
        tracing::warn!("reveals still running after {MAX_SETTLE_FRAMES} frames");
    }

    let pending = page.pending().into_iter().map(str::to_owned).collect();
    page.unmount();

    Ok(Simulation {
        document_height,
        reports,
        pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("1280x800").unwrap(), Size::new(1280.0, 800.0));
        assert_eq!(parse_viewport("375X667").unwrap(), Size::new(375.0, 667.0));
        assert!(parse_viewport("1280").is_err());
        assert!(parse_viewport("0x800").is_err());
        assert!(parse_viewport("widexhigh").is_err());
    }

    #[test]
    fn test_scroll_to_bottom_reveals_everything() {
        let config = PageConfig::storefront().unwrap();
        let sim = run(config, SimulationOptions::default()).unwrap();

        assert!(sim.pending.is_empty(), "{:?}", sim.pending);
        assert_eq!(sim.triggered().count(), 9);
        let last = sim.final_report().unwrap();
        assert_eq!(last.progress, 1.0);
        assert!(last.is_idle());
    }

    #[test]
    fn test_short_scroll_leaves_lower_sections_pending() {
        let config = PageConfig::storefront().unwrap();
        let options = SimulationOptions {
            to: Some(0.0),
            ..Default::default()
        };
        let sim = run(config, options).unwrap();

        assert!(sim.pending.iter().any(|label| label == "collections.items[0]"));
        assert!(sim.triggered().any(|label| label == "hero.intro"));
    }

    #[test]
    fn test_zero_fps_rejected() {
        let config = PageConfig::storefront().unwrap();
        let options = SimulationOptions {
            fps: 0,
            ..Default::default()
        };
        assert!(run(config, options).is_err());
    }
}
