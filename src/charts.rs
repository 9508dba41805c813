use std::collections::BTreeMap;

use anyhow::Result;

use crate::model::{DisplayValue, FeatureImportance, PerformanceTrend, RadarStats};
use crate::normalize::{RADAR_LABELS, normalize_radar};
use crate::view::ViewTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartSlot {
    Radar,
    Trend,
    Importance,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 3] = [ChartSlot::Radar, ChartSlot::Trend, ChartSlot::Importance];

    pub fn label(self) -> &'static str {
        match self {
            ChartSlot::Radar => "radar",
            ChartSlot::Trend => "trend",
            ChartSlot::Importance => "importance",
        }
    }

    /// Canvas the slot draws into.
    pub fn canvas(self) -> ViewTarget {
        match self {
            ChartSlot::Radar => ViewTarget::RadarCanvas,
            ChartSlot::Trend => ViewTarget::TrendCanvas,
            ChartSlot::Importance => ViewTarget::ImportanceCanvas,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Radar,
    Line,
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: Option<&'static str>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl Axis {
    fn zero_to_hundred() -> Self {
        Self {
            title: None,
            min: Some(0.0),
            max: Some(100.0),
            step: None,
        }
    }

    fn titled(title: &'static str) -> Self {
        Self {
            title: Some(title),
            min: None,
            max: None,
            step: None,
        }
    }
}

/// Everything a chart backend needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub series_label: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub value_axis: Axis,
    pub category_axis: Option<Axis>,
    pub show_legend: bool,
}

impl ChartSpec {
    pub fn radar(stats: &RadarStats) -> Self {
        let mut value_axis = Axis::zero_to_hundred();
        value_axis.step = Some(20.0);
        Self {
            kind: ChartKind::Radar,
            series_label: "Player Stats",
            labels: RADAR_LABELS.iter().map(|l| l.to_string()).collect(),
            values: normalize_radar(stats).to_vec(),
            value_axis,
            category_axis: None,
            show_legend: false,
        }
    }

    pub fn trend(trend: &PerformanceTrend) -> Self {
        let mut value_axis = Axis::zero_to_hundred();
        value_axis.title = Some("Performance Rating");
        Self {
            kind: ChartKind::Line,
            series_label: "Performance Rating",
            labels: trend.matches.iter().map(DisplayValue::to_string).collect(),
            values: trend.ratings.clone(),
            value_axis,
            category_axis: Some(Axis::titled("Match Number")),
            show_legend: true,
        }
    }

    pub fn importance(importance: &FeatureImportance) -> Self {
        let mut value_axis = Axis::titled("Importance Score");
        value_axis.min = Some(0.0);
        Self {
            kind: ChartKind::HorizontalBar,
            series_label: "Importance",
            labels: importance.features.clone(),
            values: importance.importance.clone(),
            value_axis,
            category_axis: None,
            show_legend: false,
        }
    }
}

/// A live chart owning backend resources until released.
pub trait ChartHandle {
    fn release(&mut self);
}

/// Capability to instantiate charts on a canvas.
pub trait ChartBackend {
    type Handle: ChartHandle;

    fn create(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<Self::Handle>;
}

/// Holds at most one live chart per slot.
///
/// Replacing a slot always releases the previous chart before the new one is
/// built. A factory error leaves the slot empty rather than stale.
#[derive(Debug)]
pub struct ChartRegistry<H: ChartHandle> {
    slots: BTreeMap<ChartSlot, H>,
}

impl<H: ChartHandle> Default for ChartRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ChartHandle> ChartRegistry<H> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    pub fn set_chart<F>(&mut self, slot: ChartSlot, factory: F) -> Result<&H>
    where
        F: FnOnce() -> Result<H>,
    {
        self.release(slot);
        let handle = factory()?;
        Ok(self.slots.entry(slot).or_insert(handle))
    }

    /// Returns true when a live chart was released.
    pub fn release(&mut self, slot: ChartSlot) -> bool {
        match self.slots.remove(&slot) {
            Some(mut handle) => {
                handle.release();
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        for slot in ChartSlot::ALL {
            self.release(slot);
        }
    }

    pub fn live(&self, slot: ChartSlot) -> Option<&H> {
        self.slots.get(&slot)
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }
}

impl<H: ChartHandle> Drop for ChartRegistry<H> {
    fn drop(&mut self) {
        self.release_all();
    }
}
