use anyhow::{Context, Result};

use crate::charts::{ChartBackend, ChartRegistry, ChartSlot, ChartSpec};
use crate::heatmap::HeatmapPlot;
use crate::model::{FeatureImportance, HeatmapSample, PlayerSnapshot};
use crate::prediction::{
    PREDICTION_FAILED_ALERT, PredictionField, PredictionForm, PredictionOutcome, show_outcome,
};
use crate::state::{
    Delta, DiagnosticLog, LoadOutcome, LoadPhase, LoadTicket, LogLevel, PredictionTicket, Section,
};
use crate::view::{self, ViewSurface, ViewTarget};

pub const LOAD_FAILED_ALERT: &str = "Failed to load player data. Please try again.";

/// Page-session controller: owns the view surface, the chart registry and the
/// load state machine. All mutation happens on the thread that owns it.
pub struct Dashboard<S: ViewSurface, B: ChartBackend> {
    surface: S,
    chart_backend: B,
    charts: ChartRegistry<B::Handle>,
    phase: LoadPhase,
    last_outcome: Option<LoadOutcome>,
    current_player: Option<String>,
    load_generation: u64,
    failed_generation: Option<u64>,
    prediction: PredictionForm,
    prediction_generation: u64,
    prediction_pending: bool,
    log: DiagnosticLog,
}

impl<S: ViewSurface, B: ChartBackend> Dashboard<S, B> {
    pub fn new(surface: S, chart_backend: B) -> Self {
        Self {
            surface,
            chart_backend,
            charts: ChartRegistry::new(),
            phase: LoadPhase::Idle,
            last_outcome: None,
            current_player: None,
            load_generation: 0,
            failed_generation: None,
            prediction: PredictionForm::new(),
            prediction_generation: 0,
            prediction_pending: false,
            log: DiagnosticLog::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn charts(&self) -> &ChartRegistry<B::Handle> {
        &self.charts
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn last_outcome(&self) -> Option<LoadOutcome> {
        self.last_outcome
    }

    pub fn current_player(&self) -> Option<&str> {
        self.current_player.as_deref()
    }

    pub fn prediction_form(&self) -> &PredictionForm {
        &self.prediction
    }

    pub fn prediction_pending(&self) -> bool {
        self.prediction_pending
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn push_log(&mut self, level: LogLevel, msg: impl AsRef<str>) {
        self.log.push(level, msg);
    }

    /// Start a player load. The returned ticket is the only one whose results
    /// will be applied until the next call.
    pub fn begin_load(&mut self, player: &str) -> LoadTicket {
        self.load_generation += 1;
        self.phase = LoadPhase::Loading;
        self.current_player = Some(player.to_string());
        self.set_loading(true);
        self.log.push(LogLevel::Info, format!("Loading player {player}"));
        LoadTicket {
            generation: self.load_generation,
            player: player.to_string(),
        }
    }

    pub fn on_prediction_input(&mut self, field: PredictionField, raw: &str) {
        self.prediction.on_input(field, raw, &mut self.surface);
    }

    pub fn nudge_prediction(&mut self, field: PredictionField, steps: i32) {
        self.prediction.nudge(field, steps, &mut self.surface);
    }

    /// Collect the form into a request. Uncoercible input raises an alert and
    /// no request is made.
    pub fn begin_prediction(&mut self) -> Option<PredictionTicket> {
        let input = match self.prediction.collect() {
            Ok(input) => input,
            Err(err) => {
                let msg = format!("Invalid prediction input: {err:#}");
                self.log.push(LogLevel::Warn, &msg);
                self.surface.alert(&msg);
                return None;
            }
        };
        self.prediction_generation += 1;
        self.prediction_pending = true;
        Some(PredictionTicket {
            generation: self.prediction_generation,
            input,
        })
    }

    pub fn apply_delta(&mut self, delta: Delta) {
        match delta {
            Delta::PlayerLoaded {
                generation,
                player,
                snapshot,
            } => {
                if !self.is_current_load(generation, "player snapshot") {
                    return;
                }
                match self.render_snapshot(&snapshot) {
                    Ok(()) => {
                        if self.surface.has_target(ViewTarget::Dashboard) {
                            self.surface.set_visible(ViewTarget::Dashboard, true);
                        }
                        self.finish_load(LoadOutcome::Success);
                        self.log.push(LogLevel::Info, format!("Loaded {player}"));
                    }
                    Err(err) => self.fail_load(&player, &format!("{err:#}")),
                }
            }
            Delta::PlayerFailed {
                generation,
                player,
                error,
            } => {
                if !self.is_current_load(generation, "player failure") {
                    return;
                }
                self.fail_load(&player, &error);
            }
            Delta::HeatmapLoaded {
                generation,
                player,
                sample,
            } => {
                if !self.is_live_load(generation, "heatmap") {
                    return;
                }
                if let Err(err) = self.render_heatmap(&sample) {
                    self.section_failed(Section::Heatmap, &format!("{player}: {err:#}"));
                }
            }
            Delta::ImportanceLoaded {
                generation,
                importance,
            } => {
                if !self.is_live_load(generation, "feature importance") {
                    return;
                }
                if let Err(err) = self.render_importance(&importance) {
                    self.section_failed(Section::FeatureImportance, &format!("{err:#}"));
                }
            }
            Delta::SectionFailed {
                generation,
                section,
                error,
            } => {
                if !self.is_live_load(generation, section.label()) {
                    return;
                }
                self.section_failed(section, &error);
            }
            Delta::PredictionResolved {
                generation,
                response,
            } => {
                if !self.is_current_prediction(generation) {
                    return;
                }
                self.prediction_pending = false;
                let outcome = PredictionOutcome::from_response(&response);
                if let PredictionOutcome::Rejected(reason) = &outcome {
                    self.log.push(LogLevel::Warn, reason);
                }
                show_outcome(&outcome, &mut self.surface);
            }
            Delta::PredictionFailed { generation, error } => {
                if !self.is_current_prediction(generation) {
                    return;
                }
                self.prediction_pending = false;
                self.log.push(LogLevel::Error, format!("Prediction failed: {error}"));
                self.surface.alert(PREDICTION_FAILED_ALERT);
            }
            Delta::Log(level, msg) => self.log.push(level, msg),
        }
    }

    fn is_current_load(&mut self, generation: u64, what: &str) -> bool {
        if generation == self.load_generation {
            return true;
        }
        self.log.push(
            LogLevel::Debug,
            format!(
                "Discarded stale {what} (generation {generation}, latest {})",
                self.load_generation
            ),
        );
        false
    }

    /// Secondary results are applied only while their load is current and its
    /// primary render did not fail.
    fn is_live_load(&mut self, generation: u64, what: &str) -> bool {
        if !self.is_current_load(generation, what) {
            return false;
        }
        if self.failed_generation == Some(generation) {
            self.log.push(
                LogLevel::Debug,
                format!("Discarded {what} for failed load (generation {generation})"),
            );
            return false;
        }
        true
    }

    fn is_current_prediction(&mut self, generation: u64) -> bool {
        if generation == self.prediction_generation {
            return true;
        }
        self.log.push(
            LogLevel::Debug,
            format!("Discarded stale prediction (generation {generation})"),
        );
        false
    }

    fn render_snapshot(&mut self, snapshot: &PlayerSnapshot) -> Result<()> {
        view::bind_player_info(snapshot, &mut self.surface);
        view::bind(snapshot, &view::detail_bindings(), &mut self.surface);
        self.draw_chart(ChartSlot::Radar, ChartSpec::radar(&snapshot.radar_stats))?;
        self.draw_chart(
            ChartSlot::Trend,
            ChartSpec::trend(&snapshot.performance_trend),
        )?;
        view::bind_recent_matches(&snapshot.recent_matches, &mut self.surface);
        Ok(())
    }

    fn render_heatmap(&mut self, sample: &HeatmapSample) -> Result<()> {
        if !self.surface.has_target(ViewTarget::HeatmapContainer) {
            return Ok(());
        }
        let plot = HeatmapPlot::from_sample(sample)?;
        if plot.grid.dropped > 0 {
            self.log.push(
                LogLevel::Debug,
                format!("Heatmap dropped {} off-pitch points", plot.grid.dropped),
            );
        }
        self.surface.plot_heatmap(ViewTarget::HeatmapContainer, &plot);
        Ok(())
    }

    fn render_importance(&mut self, importance: &FeatureImportance) -> Result<()> {
        self.draw_chart(ChartSlot::Importance, ChartSpec::importance(importance))
    }

    /// Replace the chart in `slot`. A missing canvas is skipped like any other
    /// missing target.
    fn draw_chart(&mut self, slot: ChartSlot, spec: ChartSpec) -> Result<()> {
        if !self.surface.has_target(slot.canvas()) {
            return Ok(());
        }
        let backend = &mut self.chart_backend;
        self.charts
            .set_chart(slot, || backend.create(slot, &spec))
            .with_context(|| format!("{} chart", slot.label()))?;
        Ok(())
    }

    fn section_failed(&mut self, section: Section, error: &str) {
        self.log.push(
            LogLevel::Warn,
            format!("Error loading {}: {error}", section.label()),
        );
    }

    fn fail_load(&mut self, player: &str, error: &str) {
        self.log.push(
            LogLevel::Error,
            format!("Error loading player data for {player}: {error}"),
        );
        self.failed_generation = Some(self.load_generation);
        self.finish_load(LoadOutcome::Failed);
        self.surface.alert(LOAD_FAILED_ALERT);
    }

    fn finish_load(&mut self, outcome: LoadOutcome) {
        self.last_outcome = Some(outcome);
        self.phase = LoadPhase::Idle;
        self.set_loading(false);
    }

    fn set_loading(&mut self, visible: bool) {
        if self.surface.has_target(ViewTarget::LoadingIndicator) {
            self.surface.set_visible(ViewTarget::LoadingIndicator, visible);
        }
    }
}
