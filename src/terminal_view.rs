use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::charts::{ChartBackend, ChartHandle, ChartSlot, ChartSpec};
use crate::heatmap::{FIELD_LENGTH, FIELD_WIDTH, FieldMarking, HeatmapPlot};
use crate::prediction::PredictionField;
use crate::view::{ViewSurface, ViewTarget};

/// In-memory model of the terminal dashboard. The UI loop writes into it via
/// `ViewSurface` and the draw pass reads it back.
#[derive(Debug)]
pub struct TerminalView {
    targets: HashSet<ViewTarget>,
    texts: BTreeMap<ViewTarget, String>,
    photo: Option<(String, String)>,
    visible: BTreeMap<ViewTarget, bool>,
    match_rows: Vec<Vec<String>>,
    heatmap: Option<HeatmapPlot>,
    emphasis: Option<(ViewTarget, f32, Instant)>,
    alert: Option<String>,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView {
    pub fn new() -> Self {
        let mut targets: HashSet<ViewTarget> = HashSet::new();
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
            targets.insert(ViewTarget::PredictionInput(field));
            targets.insert(ViewTarget::PredictionReadout(field));
        }
        Self {
            targets,
            texts: BTreeMap::new(),
            photo: None,
            visible: BTreeMap::new(),
            match_rows: Vec::new(),
            heatmap: None,
            emphasis: None,
            alert: None,
        }
    }

    /// Text for `target`, or "-" before anything was bound.
    pub fn text(&self, target: ViewTarget) -> &str {
        self.texts.get(&target).map(String::as_str).unwrap_or("-")
    }

    pub fn photo(&self) -> Option<(&str, &str)> {
        self.photo
            .as_ref()
            .map(|(src, alt)| (src.as_str(), alt.as_str()))
    }

    pub fn is_visible(&self, target: ViewTarget) -> bool {
        self.visible.get(&target).copied().unwrap_or(false)
    }

    pub fn match_rows(&self) -> &[Vec<String>] {
        &self.match_rows
    }

    pub fn heatmap(&self) -> Option<&HeatmapPlot> {
        self.heatmap.as_ref()
    }

    /// True while `target` is inside its emphasis window.
    pub fn is_emphasized(&self, target: ViewTarget, now: Instant) -> bool {
        matches!(self.emphasis, Some((t, _, until)) if t == target && now < until)
    }

    pub fn pending_alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }
}

impl ViewSurface for TerminalView {
    fn has_target(&self, target: ViewTarget) -> bool {
        self.targets.contains(&target)
    }

    fn set_text(&mut self, target: ViewTarget, text: &str) {
        self.texts.insert(target, text.to_string());
    }

    fn set_image(&mut self, target: ViewTarget, src: &str, alt: &str) {
        if target == ViewTarget::PlayerPhoto {
            self.photo = Some((src.to_string(), alt.to_string()));
        }
    }

    fn set_visible(&mut self, target: ViewTarget, visible: bool) {
        self.visible.insert(target, visible);
    }

    fn replace_rows(&mut self, target: ViewTarget, rows: Vec<Vec<String>>) {
        if target == ViewTarget::MatchesTable {
            self.match_rows = rows;
        }
    }

    fn plot_heatmap(&mut self, target: ViewTarget, plot: &HeatmapPlot) {
        if target == ViewTarget::HeatmapContainer {
            self.heatmap = Some(plot.clone());
        }
    }

    fn emphasize(&mut self, target: ViewTarget, scale: f32, hold: Duration) {
        self.emphasis = Some((target, scale, Instant::now() + hold));
    }

    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }
}

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Text rendering of a heatmap, far touchline first. Empty cells that sit on
/// a pitch marking are drawn as `·`.
pub fn heatmap_rows(plot: &HeatmapPlot) -> Vec<String> {
    let grid = &plot.grid;
    let cell_w = FIELD_LENGTH / grid.bins_x.max(1) as f64;
    let cell_h = FIELD_WIDTH / grid.bins_y.max(1) as f64;
    (0..grid.bins_y)
        .rev()
        .map(|iy| {
            (0..grid.bins_x)
                .map(|ix| {
                    let level = (grid.intensity(ix, iy) * (SHADES.len() - 1) as f64).ceil();
                    let level = (level as usize).min(SHADES.len() - 1);
                    if level > 0 {
                        return SHADES[level];
                    }
                    let cx = (ix as f64 + 0.5) * cell_w;
                    let cy = (iy as f64 + 0.5) * cell_h;
                    if plot
                        .markings
                        .iter()
                        .any(|m| near_marking(m, cx, cy, cell_w / 2.0, cell_h / 2.0))
                    {
                        '·'
                    } else {
                        SHADES[0]
                    }
                })
                .collect()
        })
        .collect()
}

fn near_marking(marking: &FieldMarking, x: f64, y: f64, tol_x: f64, tol_y: f64) -> bool {
    let near = |a: f64, b: f64, tol: f64| (a - b).abs() <= tol;
    let within = |v: f64, lo: f64, hi: f64, tol: f64| v >= lo - tol && v <= hi + tol;
    match *marking {
        FieldMarking::Rect { x0, y0, x1, y1 } => {
            let on_vertical = (near(x, x0, tol_x) || near(x, x1, tol_x)) && within(y, y0, y1, tol_y);
            let on_horizontal =
                (near(y, y0, tol_y) || near(y, y1, tol_y)) && within(x, x0, x1, tol_x);
            on_vertical || on_horizontal
        }
        FieldMarking::Line { x0, y0, x1, y1 } => {
            within(x, x0.min(x1), x0.max(x1), tol_x) && within(y, y0.min(y1), y0.max(y1), tol_y)
        }
    }
}

type ChartTable = Rc<RefCell<BTreeMap<ChartSlot, (u64, ChartSpec)>>>;

/// Chart backend whose "canvas" is a table the draw pass renders from.
#[derive(Debug, Clone, Default)]
pub struct TerminalCharts {
    live: ChartTable,
    next_id: u64,
}

impl TerminalCharts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the live charts, for the draw pass.
    pub fn reader(&self) -> ChartReader {
        ChartReader {
            live: Rc::clone(&self.live),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartReader {
    live: ChartTable,
}

impl ChartReader {
    pub fn spec(&self, slot: ChartSlot) -> Option<ChartSpec> {
        self.live.borrow().get(&slot).map(|(_, spec)| spec.clone())
    }

    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.borrow().is_empty()
    }
}

#[derive(Debug)]
pub struct TerminalChart {
    id: u64,
    slot: ChartSlot,
    live: ChartTable,
}

impl ChartHandle for TerminalChart {
    fn release(&mut self) {
        let mut live = self.live.borrow_mut();
        if live.get(&self.slot).is_some_and(|(id, _)| *id == self.id) {
            live.remove(&self.slot);
        }
    }
}

impl ChartBackend for TerminalCharts {
    type Handle = TerminalChart;

    fn create(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<TerminalChart> {
        self.next_id += 1;
        self.live
            .borrow_mut()
            .insert(slot, (self.next_id, spec.clone()));
        Ok(TerminalChart {
            id: self.next_id,
            slot,
            live: Rc::clone(&self.live),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartRegistry;
    use crate::model::RadarStats;

    #[test]
    fn released_chart_leaves_table() {
        let mut backend = TerminalCharts::new();
        let reader = backend.reader();
        let mut registry = ChartRegistry::new();
        let spec = ChartSpec::radar(&RadarStats::default());
        registry
            .set_chart(ChartSlot::Radar, || backend.create(ChartSlot::Radar, &spec))
            .unwrap();
        registry
            .set_chart(ChartSlot::Radar, || backend.create(ChartSlot::Radar, &spec))
            .unwrap();
        assert_eq!(reader.len(), 1);
        drop(registry);
        assert!(reader.is_empty());
    }

    #[test]
    fn emphasis_expires() {
        let mut view = TerminalView::new();
        view.emphasize(ViewTarget::PredictionResult, 1.2, Duration::from_millis(300));
        let now = Instant::now();
        assert!(view.is_emphasized(ViewTarget::PredictionResult, now));
        assert!(!view.is_emphasized(
            ViewTarget::PredictionResult,
            now + Duration::from_secs(1)
        ));
    }

    #[test]
    fn heatmap_rows_shade_peak_and_draw_halfway_line() {
        use crate::model::HeatmapSample;

        let sample = HeatmapSample {
            x: vec![10.0, 10.0],
            y: vec![60.0, 60.0],
        };
        let plot = HeatmapPlot::from_sample(&sample).unwrap();
        let rows = heatmap_rows(&plot);
        assert_eq!(rows.len(), plot.grid.bins_y);
        assert!(rows.iter().all(|r| r.chars().count() == plot.grid.bins_x));
        assert_eq!(rows.iter().filter(|r| r.contains('█')).count(), 1);
        let middle = rows[plot.grid.bins_y / 2].chars().nth(plot.grid.bins_x / 2);
        assert_eq!(middle, Some('·'));
    }

    #[test]
    fn unbound_text_reads_as_dash() {
        let view = TerminalView::new();
        assert_eq!(view.text(ViewTarget::StatGoals), "-");
        assert!(view.has_target(ViewTarget::PlayerPhoto));
    }
}
