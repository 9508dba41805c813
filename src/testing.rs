//! Recording doubles for the view and chart capabilities, used by the unit
//! and integration tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::charts::{ChartBackend, ChartHandle, ChartSlot, ChartSpec};
use crate::heatmap::HeatmapPlot;
use crate::prediction::PredictionField;
use crate::view::{ViewSurface, ViewTarget};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceWrite {
    Text(ViewTarget, String),
    Image(ViewTarget, String, String),
    Visible(ViewTarget, bool),
    Rows(ViewTarget, usize),
    Heatmap(ViewTarget),
}

impl SurfaceWrite {
    pub fn target(&self) -> ViewTarget {
        match self {
            SurfaceWrite::Text(t, _)
            | SurfaceWrite::Image(t, _, _)
            | SurfaceWrite::Visible(t, _)
            | SurfaceWrite::Rows(t, _)
            | SurfaceWrite::Heatmap(t) => *t,
        }
    }
}

/// Surface that records every write in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    targets: HashSet<ViewTarget>,
    pub writes: Vec<SurfaceWrite>,
    pub texts: BTreeMap<ViewTarget, String>,
    pub images: BTreeMap<ViewTarget, (String, String)>,
    pub visible: BTreeMap<ViewTarget, bool>,
    pub tables: BTreeMap<ViewTarget, Vec<Vec<String>>>,
    pub heatmap: Option<HeatmapPlot>,
    pub emphasized: Vec<ViewTarget>,
    pub alerts: Vec<String>,
}

impl RecordingSurface {
    pub fn with_targets(targets: &[ViewTarget]) -> Self {
        Self {
            targets: targets.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Every target the full dashboard layout has.
    pub fn full() -> Self {
        let mut targets: Vec<ViewTarget> = Vec::new();
        targets.extend(ViewTarget::PROFILE);
        targets.extend(ViewTarget::STAT_CARDS);
        targets.extend(ViewTarget::DETAILS);
        targets.extend([
            ViewTarget::RadarCanvas,
            ViewTarget::TrendCanvas,
            ViewTarget::ImportanceCanvas,
            ViewTarget::HeatmapContainer,
            ViewTarget::MatchesTable,
            ViewTarget::PredictionResult,
            ViewTarget::Dashboard,
            ViewTarget::LoadingIndicator,
        ]);
        for field in PredictionField::ALL {
            targets.push(ViewTarget::PredictionInput(field));
            targets.push(ViewTarget::PredictionReadout(field));
        }
        Self::with_targets(&targets)
    }

    pub fn without(mut self, target: ViewTarget) -> Self {
        self.targets.remove(&target);
        self
    }

    pub fn text(&self, target: ViewTarget) -> Option<&str> {
        self.texts.get(&target).map(String::as_str)
    }

    pub fn image(&self, target: ViewTarget) -> Option<(&str, &str)> {
        self.images
            .get(&target)
            .map(|(src, alt)| (src.as_str(), alt.as_str()))
    }

    pub fn rows(&self, target: ViewTarget) -> Option<&Vec<Vec<String>>> {
        self.tables.get(&target)
    }

    pub fn is_visible(&self, target: ViewTarget) -> Option<bool> {
        self.visible.get(&target).copied()
    }

    pub fn writes_to(&self, target: ViewTarget) -> usize {
        self.writes.iter().filter(|w| w.target() == target).count()
    }

    /// How many times `target` was hidden.
    pub fn hides(&self, target: ViewTarget) -> usize {
        self.writes
            .iter()
            .filter(|w| **w == SurfaceWrite::Visible(target, false))
            .count()
    }
}

impl ViewSurface for RecordingSurface {
    fn has_target(&self, target: ViewTarget) -> bool {
        self.targets.contains(&target)
    }

    fn set_text(&mut self, target: ViewTarget, text: &str) {
        self.writes.push(SurfaceWrite::Text(target, text.to_string()));
        self.texts.insert(target, text.to_string());
    }

    fn set_image(&mut self, target: ViewTarget, src: &str, alt: &str) {
        self.writes.push(SurfaceWrite::Image(target, src.to_string(), alt.to_string()));
        self.images.insert(target, (src.to_string(), alt.to_string()));
    }

    fn set_visible(&mut self, target: ViewTarget, visible: bool) {
        self.writes.push(SurfaceWrite::Visible(target, visible));
        self.visible.insert(target, visible);
    }

    fn replace_rows(&mut self, target: ViewTarget, rows: Vec<Vec<String>>) {
        self.writes.push(SurfaceWrite::Rows(target, rows.len()));
        self.tables.insert(target, rows);
    }

    fn plot_heatmap(&mut self, target: ViewTarget, plot: &HeatmapPlot) {
        self.writes.push(SurfaceWrite::Heatmap(target));
        self.heatmap = Some(plot.clone());
    }

    fn emphasize(&mut self, target: ViewTarget, _scale: f32, _hold: Duration) {
        self.emphasized.push(target);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct ChartLedger {
    pub created: Vec<(ChartSlot, ChartSpec)>,
    pub released: Vec<(ChartSlot, u32)>,
    pub fail_next: Option<ChartSlot>,
}

impl ChartLedger {
    pub fn live_ids(&self) -> Vec<u32> {
        (1..=self.created.len() as u32)
            .filter(|id| !self.released.iter().any(|(_, r)| r == id))
            .collect()
    }

    pub fn releases_for(&self, slot: ChartSlot) -> usize {
        self.released.iter().filter(|(s, _)| *s == slot).count()
    }
}

/// Chart backend that records creations and releases.
#[derive(Debug, Clone, Default)]
pub struct RecordingCharts {
    pub ledger: Rc<RefCell<ChartLedger>>,
}

#[derive(Debug)]
pub struct RecordedChart {
    pub id: u32,
    pub slot: ChartSlot,
    ledger: Rc<RefCell<ChartLedger>>,
}

impl ChartHandle for RecordedChart {
    fn release(&mut self) {
        self.ledger.borrow_mut().released.push((self.slot, self.id));
    }
}

impl ChartBackend for RecordingCharts {
    type Handle = RecordedChart;

    fn create(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<RecordedChart> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.fail_next == Some(slot) {
            ledger.fail_next = None;
            return Err(anyhow!("{} canvas unavailable", slot.label()));
        }
        ledger.created.push((slot, spec.clone()));
        Ok(RecordedChart {
            id: ledger.created.len() as u32,
            slot,
            ledger: Rc::clone(&self.ledger),
        })
    }
}
