use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use scout_dash::api_fetch::{Backend, parse_heatmap_json, parse_player_json};
use scout_dash::charts::ChartSpec;
use scout_dash::demo_feed::DemoBackend;
use scout_dash::heatmap::{DEFAULT_BINS_X, DEFAULT_BINS_Y, HeatmapPlot, bin_heatmap};
use scout_dash::normalize::normalize_radar;
use scout_dash::orchestrator::Dashboard;
use scout_dash::state::Delta;
use scout_dash::terminal_view::{TerminalCharts, TerminalView, heatmap_rows};

fn bench_player_parse(c: &mut Criterion) {
    c.bench_function("player_parse", |b| {
        b.iter(|| {
            let snapshot = parse_player_json(black_box(PLAYER_JSON)).unwrap();
            black_box(snapshot.recent_matches.len());
        })
    });
}

fn bench_heatmap_parse(c: &mut Criterion) {
    c.bench_function("heatmap_parse", |b| {
        b.iter(|| {
            let sample = parse_heatmap_json(black_box(HEATMAP_JSON)).unwrap();
            black_box(sample.x.len());
        })
    });
}

fn bench_radar_normalize(c: &mut Criterion) {
    let snapshot = parse_player_json(PLAYER_JSON).expect("valid fixture json");
    c.bench_function("radar_normalize", |b| {
        b.iter(|| {
            let values = normalize_radar(black_box(&snapshot.radar_stats));
            black_box(values[0]);
        })
    });
}

fn bench_heatmap_binning(c: &mut Criterion) {
    let sample = DemoBackend::new()
        .heatmap("Bench Player")
        .expect("demo heatmap");
    c.bench_function("heatmap_binning", |b| {
        b.iter(|| {
            let grid = bin_heatmap(black_box(&sample), DEFAULT_BINS_X, DEFAULT_BINS_Y).unwrap();
            black_box(grid.peak);
        })
    });
}

fn bench_heatmap_rows(c: &mut Criterion) {
    let sample = DemoBackend::new()
        .heatmap("Bench Player")
        .expect("demo heatmap");
    let plot = HeatmapPlot::from_sample(&sample).expect("plot");
    c.bench_function("heatmap_rows", |b| {
        b.iter(|| {
            let rows = heatmap_rows(black_box(&plot));
            black_box(rows.len());
        })
    });
}

fn bench_snapshot_render(c: &mut Criterion) {
    let snapshot = parse_player_json(PLAYER_JSON).expect("valid fixture json");
    let mut dashboard = Dashboard::new(TerminalView::new(), TerminalCharts::new());
    c.bench_function("snapshot_render", |b| {
        b.iter(|| {
            let ticket = dashboard.begin_load("Bench Player");
            dashboard.apply_delta(Delta::PlayerLoaded {
                generation: ticket.generation,
                player: ticket.player,
                snapshot: Box::new(snapshot.clone()),
            });
            black_box(dashboard.charts().live_count());
        })
    });
}

fn bench_trend_spec(c: &mut Criterion) {
    let snapshot = parse_player_json(PLAYER_JSON).expect("valid fixture json");
    c.bench_function("trend_spec", |b| {
        b.iter(|| {
            let spec = ChartSpec::trend(black_box(&snapshot.performance_trend));
            black_box(spec.labels.len());
        })
    });
}

criterion_group!(
    perf,
    bench_player_parse,
    bench_heatmap_parse,
    bench_radar_normalize,
    bench_heatmap_binning,
    bench_heatmap_rows,
    bench_snapshot_render,
    bench_trend_spec
);
criterion_main!(perf);

static PLAYER_JSON: &str = include_str!("../tests/fixtures/player.json");
static HEATMAP_JSON: &str = include_str!("../tests/fixtures/heatmap.json");
