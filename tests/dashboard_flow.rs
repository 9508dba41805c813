use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use scout_dash::api_fetch::parse_player_json;
use scout_dash::charts::{ChartKind, ChartSlot};
use scout_dash::model::{
    DisplayValue, FeatureImportance, HeatmapSample, PlayerSnapshot, PredictionResponse,
};
use scout_dash::orchestrator::{Dashboard, LOAD_FAILED_ALERT};
use scout_dash::prediction::{PREDICTION_FAILED_ALERT, PredictionField};
use scout_dash::state::{Delta, LoadOutcome, LoadPhase, LogLevel, Section};
use scout_dash::testing::{ChartLedger, RecordingCharts, RecordingSurface};
use scout_dash::view::ViewTarget;

type TestDashboard = Dashboard<RecordingSurface, RecordingCharts>;

fn dashboard_with(surface: RecordingSurface) -> (TestDashboard, Rc<RefCell<ChartLedger>>) {
    let charts = RecordingCharts::default();
    let ledger = Rc::clone(&charts.ledger);
    (Dashboard::new(surface, charts), ledger)
}

fn dashboard() -> (TestDashboard, Rc<RefCell<ChartLedger>>) {
    dashboard_with(RecordingSurface::full())
}

fn fixture_snapshot() -> PlayerSnapshot {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("player.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    parse_player_json(&raw).expect("fixture should parse")
}

fn snapshot_with_goals(name: &str, goals: f64) -> PlayerSnapshot {
    PlayerSnapshot {
        player_name: Some(name.to_string()),
        total_goals: Some(DisplayValue::Number(goals)),
        ..fixture_snapshot()
    }
}

fn loaded(generation: u64, snapshot: PlayerSnapshot) -> Delta {
    Delta::PlayerLoaded {
        generation,
        player: snapshot.player_name.clone().unwrap_or_default(),
        snapshot: Box::new(snapshot),
    }
}

#[test]
fn successful_load_renders_every_section() {
    let (mut dash, ledger) = dashboard();
    let ticket = dash.begin_load("Bukayo Saka");
    assert_eq!(dash.phase(), LoadPhase::Loading);
    assert_eq!(
        dash.surface().is_visible(ViewTarget::LoadingIndicator),
        Some(true)
    );

    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));

    let surface = dash.surface();
    assert_eq!(surface.text(ViewTarget::StatGoals), Some("5"));
    assert_eq!(surface.text(ViewTarget::StatPerformance), Some("71.42"));
    assert_eq!(surface.text(ViewTarget::DetailShotAccuracy), Some("54.5%"));
    assert_eq!(surface.text(ViewTarget::PlayerAge), Some("24 years"));
    assert_eq!(
        surface.text(ViewTarget::PlayerPosition),
        Some("Right Winger, Right Midfield")
    );
    assert_eq!(surface.is_visible(ViewTarget::LoadingIndicator), Some(false));
    assert_eq!(surface.is_visible(ViewTarget::Dashboard), Some(true));
    assert!(surface.alerts.is_empty());

    let rows = surface.rows(ViewTarget::MatchesTable).expect("table rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "Match 101");
    assert_eq!(rows[1][4], "83.33%");

    assert_eq!(dash.phase(), LoadPhase::Idle);
    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Success));
    assert_eq!(dash.charts().live_count(), 2);

    let ledger = ledger.borrow();
    let (slot, trend) = &ledger.created[1];
    assert_eq!(*slot, ChartSlot::Trend);
    assert_eq!(trend.kind, ChartKind::Line);
    assert_eq!(trend.labels, vec!["101", "102", "103"]);
    assert_eq!(trend.values, vec![64.5, 88.0, 61.76]);
}

#[test]
fn primary_failure_alerts_once_and_clears_loading() {
    let (mut dash, ledger) = dashboard();
    let ticket = dash.begin_load("Nobody");
    dash.apply_delta(Delta::PlayerFailed {
        generation: ticket.generation,
        player: "Nobody".to_string(),
        error: "http 404 Not Found".to_string(),
    });

    let surface = dash.surface();
    assert_eq!(surface.alerts, vec![LOAD_FAILED_ALERT.to_string()]);
    assert_eq!(surface.hides(ViewTarget::LoadingIndicator), 1);
    assert_eq!(surface.is_visible(ViewTarget::Dashboard), None);
    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Failed));
    assert!(dash.log().contains(LogLevel::Error, "404"));
    assert!(ledger.borrow().created.is_empty());
}

#[test]
fn stale_load_cannot_overwrite_newer_one() {
    let (mut dash, _ledger) = dashboard();
    let first = dash.begin_load("A");
    let second = dash.begin_load("B");

    dash.apply_delta(loaded(second.generation, snapshot_with_goals("B", 7.0)));
    dash.apply_delta(loaded(first.generation, snapshot_with_goals("A", 1.0)));
    dash.apply_delta(Delta::PlayerFailed {
        generation: first.generation,
        player: "A".to_string(),
        error: "late".to_string(),
    });

    assert_eq!(dash.surface().text(ViewTarget::StatGoals), Some("7"));
    assert!(dash.surface().alerts.is_empty());
    assert_eq!(dash.current_player(), Some("B"));
    assert!(dash.log().contains(LogLevel::Debug, "Discarded stale"));
}

#[test]
fn reload_replaces_charts_instead_of_stacking() {
    let (mut dash, ledger) = dashboard();
    for _ in 0..2 {
        let ticket = dash.begin_load("Bukayo Saka");
        dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));
    }

    assert_eq!(dash.charts().live_count(), 2);
    let ledger = ledger.borrow();
    assert_eq!(ledger.created.len(), 4);
    assert_eq!(ledger.releases_for(ChartSlot::Radar), 1);
    assert_eq!(ledger.releases_for(ChartSlot::Trend), 1);
    assert_eq!(ledger.live_ids(), vec![3, 4]);
}

#[test]
fn dropping_the_dashboard_releases_live_charts() {
    let (mut dash, ledger) = dashboard();
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));
    drop(dash);
    assert!(ledger.borrow().live_ids().is_empty());
}

#[test]
fn secondary_sections_render_or_only_log() {
    let (mut dash, ledger) = dashboard();
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));

    dash.apply_delta(Delta::SectionFailed {
        generation: ticket.generation,
        section: Section::Heatmap,
        error: "timed out".to_string(),
    });
    dash.apply_delta(Delta::ImportanceLoaded {
        generation: ticket.generation,
        importance: FeatureImportance {
            features: vec!["goals".to_string(), "assists".to_string()],
            importance: vec![0.6, 0.4],
        },
    });

    assert!(dash.surface().alerts.is_empty());
    assert_eq!(dash.surface().is_visible(ViewTarget::Dashboard), Some(true));
    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Success));
    assert!(dash.log().contains(LogLevel::Warn, "Error loading heatmap"));
    assert!(dash.surface().heatmap.is_none());

    let ledger = ledger.borrow();
    let (slot, spec) = ledger.created.last().expect("importance chart");
    assert_eq!(*slot, ChartSlot::Importance);
    assert_eq!(spec.kind, ChartKind::HorizontalBar);
    assert_eq!(spec.labels, vec!["goals", "assists"]);
}

#[test]
fn heatmap_arrives_after_primary_render() {
    let (mut dash, _ledger) = dashboard();
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));
    dash.apply_delta(Delta::HeatmapLoaded {
        generation: ticket.generation,
        player: "Bukayo Saka".to_string(),
        sample: HeatmapSample {
            x: vec![10.0, 50.0, 200.0],
            y: vec![10.0, 30.0, 10.0],
        },
    });

    let plot = dash.surface().heatmap.as_ref().expect("heatmap plotted");
    assert_eq!(plot.grid.total(), 2);
    assert_eq!(plot.grid.dropped, 1);
    assert!(dash.log().contains(LogLevel::Debug, "off-pitch"));
}

#[test]
fn chart_failure_fails_the_load() {
    let (mut dash, ledger) = dashboard();
    ledger.borrow_mut().fail_next = Some(ChartSlot::Radar);
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));

    assert_eq!(dash.surface().alerts, vec![LOAD_FAILED_ALERT.to_string()]);
    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Failed));
    assert!(dash.charts().live(ChartSlot::Radar).is_none());
    assert_eq!(
        dash.surface().is_visible(ViewTarget::LoadingIndicator),
        Some(false)
    );
}

#[test]
fn secondaries_for_a_failed_render_are_dropped() {
    let (mut dash, ledger) = dashboard();
    ledger.borrow_mut().fail_next = Some(ChartSlot::Radar);
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));
    dash.apply_delta(Delta::HeatmapLoaded {
        generation: ticket.generation,
        player: "Bukayo Saka".to_string(),
        sample: HeatmapSample {
            x: vec![20.0, 30.0],
            y: vec![20.0, 30.0],
        },
    });
    dash.apply_delta(Delta::ImportanceLoaded {
        generation: ticket.generation,
        importance: FeatureImportance {
            features: vec!["goals".to_string()],
            importance: vec![1.0],
        },
    });
    dash.apply_delta(Delta::SectionFailed {
        generation: ticket.generation,
        section: Section::Heatmap,
        error: "timed out".to_string(),
    });

    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Failed));
    assert_eq!(dash.surface().alerts, vec![LOAD_FAILED_ALERT.to_string()]);
    assert!(dash.surface().heatmap.is_none());
    assert!(dash.charts().live(ChartSlot::Importance).is_none());
    assert!(!dash.log().contains(LogLevel::Warn, "Error loading heatmap"));
    assert!(dash.log().contains(LogLevel::Debug, "for failed load"));

    let retry = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(retry.generation, fixture_snapshot()));
    dash.apply_delta(Delta::ImportanceLoaded {
        generation: retry.generation,
        importance: FeatureImportance {
            features: vec!["goals".to_string()],
            importance: vec![1.0],
        },
    });
    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Success));
    assert!(dash.charts().live(ChartSlot::Importance).is_some());
}

#[test]
fn missing_targets_are_skipped() {
    let (mut dash, ledger) = dashboard_with(RecordingSurface::with_targets(&[]));
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));

    assert!(dash.surface().writes.is_empty());
    assert!(ledger.borrow().created.is_empty());
    assert_eq!(dash.last_outcome(), Some(LoadOutcome::Success));
}

#[test]
fn photo_gates_the_profile_panel() {
    let surface = RecordingSurface::full().without(ViewTarget::PlayerPhoto);
    let (mut dash, _ledger) = dashboard_with(surface);
    let ticket = dash.begin_load("Bukayo Saka");
    dash.apply_delta(loaded(ticket.generation, fixture_snapshot()));

    assert_eq!(dash.surface().text(ViewTarget::PlayerNationality), None);
    assert_eq!(dash.surface().text(ViewTarget::StatGoals), Some("5"));
}

#[test]
fn prediction_success_shows_value_with_emphasis() {
    let (mut dash, _ledger) = dashboard();
    let ticket = dash.begin_prediction().expect("defaults are valid");
    assert_eq!(ticket.input.minutes_played, 90);
    assert_eq!(ticket.input.pass_accuracy, 85.0);
    assert!(dash.prediction_pending());

    dash.apply_delta(Delta::PredictionResolved {
        generation: ticket.generation,
        response: PredictionResponse {
            status: Some("success".to_string()),
            prediction: Some(DisplayValue::Number(70.25)),
            error: None,
        },
    });

    assert_eq!(dash.surface().text(ViewTarget::PredictionResult), Some("70.25"));
    assert_eq!(dash.surface().emphasized, vec![ViewTarget::PredictionResult]);
    assert!(!dash.prediction_pending());
}

#[test]
fn all_zero_form_submits_zeroes_and_shows_result() {
    let (mut dash, _ledger) = dashboard();
    for field in PredictionField::ALL {
        dash.on_prediction_input(field, "0");
    }
    let ticket = dash.begin_prediction().expect("zeroes are valid");
    let input = &ticket.input;
    assert_eq!(
        [
            input.minutes_played,
            input.goals,
            input.assists,
            input.shots,
            input.shots_on_target,
            input.passes_completed,
            input.tackles,
            input.interceptions,
            input.dribbles_completed,
        ],
        [0; 9]
    );
    assert_eq!(input.pass_accuracy, 0.0);

    dash.apply_delta(Delta::PredictionResolved {
        generation: ticket.generation,
        response: PredictionResponse {
            status: Some("success".to_string()),
            prediction: Some(DisplayValue::Number(42.0)),
            error: None,
        },
    });
    assert_eq!(dash.surface().text(ViewTarget::PredictionResult), Some("42"));
    assert_eq!(dash.surface().emphasized, vec![ViewTarget::PredictionResult]);
}

#[test]
fn prediction_rejection_and_failure_alert() {
    let (mut dash, _ledger) = dashboard();
    let ticket = dash.begin_prediction().expect("defaults are valid");
    dash.apply_delta(Delta::PredictionResolved {
        generation: ticket.generation,
        response: PredictionResponse {
            status: None,
            prediction: None,
            error: Some("model not loaded".to_string()),
        },
    });
    let ticket = dash.begin_prediction().expect("defaults are valid");
    dash.apply_delta(Delta::PredictionFailed {
        generation: ticket.generation,
        error: "connection refused".to_string(),
    });

    let alerts = &dash.surface().alerts;
    assert_eq!(alerts.len(), 2);
    assert!(alerts[0].contains("model not loaded"));
    assert_eq!(alerts[1], PREDICTION_FAILED_ALERT);
    assert_eq!(dash.surface().text(ViewTarget::PredictionResult), None);
}

#[test]
fn stale_prediction_is_discarded() {
    let (mut dash, _ledger) = dashboard();
    let first = dash.begin_prediction().expect("valid");
    let second = dash.begin_prediction().expect("valid");
    let answer = |value: f64| PredictionResponse {
        status: Some("success".to_string()),
        prediction: Some(DisplayValue::Number(value)),
        error: None,
    };
    dash.apply_delta(Delta::PredictionResolved {
        generation: second.generation,
        response: answer(70.5),
    });
    dash.apply_delta(Delta::PredictionResolved {
        generation: first.generation,
        response: answer(12.0),
    });
    assert_eq!(dash.surface().text(ViewTarget::PredictionResult), Some("70.5"));
}

#[test]
fn invalid_prediction_input_never_sends() {
    let (mut dash, _ledger) = dashboard();
    dash.on_prediction_input(PredictionField::Goals, "abc");
    assert_eq!(
        dash.surface().text(ViewTarget::PredictionReadout(PredictionField::Goals)),
        Some("abc")
    );
    assert!(dash.begin_prediction().is_none());
    assert_eq!(dash.surface().alerts.len(), 1);
    assert!(!dash.prediction_pending());
}

#[test]
fn nudge_clamps_to_slider_bounds() {
    let (mut dash, _ledger) = dashboard();
    dash.nudge_prediction(PredictionField::Goals, 50);
    assert_eq!(dash.prediction_form().value(PredictionField::Goals), "5");
    dash.nudge_prediction(PredictionField::PassAccuracy, 1);
    assert_eq!(
        dash.prediction_form().value(PredictionField::PassAccuracy),
        "85.5"
    );
}
