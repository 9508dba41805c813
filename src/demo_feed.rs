use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api_fetch::Backend;
use crate::heatmap::{FIELD_LENGTH, FIELD_WIDTH};
use crate::model::{
    DisplayValue, FeatureImportance, HeatmapSample, MatchRecord, PerformanceTrend, PlayerSnapshot,
    PredictionInput, PredictionResponse, RadarStats,
};

pub const DEMO_PLAYERS: [&str; 6] = [
    "Bukayo Saka",
    "Declan Rice",
    "William Saliba",
    "Cole Palmer",
    "Alexander Isak",
    "Jordan Pickford",
];

const MATCHES_PER_PLAYER: usize = 12;
const RECENT_MATCHES: usize = 10;
const HEATMAP_POINTS: usize = 200;

/// Scores the prediction form's fields, highest first.
const FEATURE_WEIGHTS: [(&str, f64); 10] = [
    ("goals", 0.27),
    ("pass_accuracy", 0.18),
    ("assists", 0.14),
    ("tackles", 0.11),
    ("interceptions", 0.10),
    ("dribbles_completed", 0.07),
    ("shots_on_target", 0.05),
    ("passes_completed", 0.04),
    ("shots", 0.02),
    ("minutes_played", 0.02),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Forward => "Forward",
            Role::Midfielder => "Midfielder",
            Role::Defender => "Defender",
            Role::Goalkeeper => "Goalkeeper",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MatchLine {
    goals: u32,
    assists: u32,
    shots: u32,
    shots_on_target: u32,
    passes_completed: u32,
    pass_accuracy: f64,
    tackles: u32,
    interceptions: u32,
    dribbles_completed: u32,
    rating: f64,
}

/// Offline backend producing stable synthetic data per player name.
#[derive(Debug, Clone, Default)]
pub struct DemoBackend {
    /// Fail every heatmap request, to exercise section isolation.
    pub fail_heatmap: bool,
}

impl DemoBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for DemoBackend {
    fn player(&self, name: &str) -> Result<PlayerSnapshot> {
        if name.trim().is_empty() {
            return Err(anyhow!("http 404 Not Found: {{\"error\": \"Not found\"}}"));
        }
        let mut rng = seeded_rng(name);
        let role = role_for(name);
        let lines: Vec<MatchLine> = (0..MATCHES_PER_PLAYER)
            .map(|_| sample_match(&mut rng, role))
            .collect();
        Ok(build_snapshot(name, role, &lines, &mut rng))
    }

    fn heatmap(&self, name: &str) -> Result<HeatmapSample> {
        if self.fail_heatmap {
            return Err(anyhow!("heatmap service unavailable"));
        }
        let mut rng = seeded_rng(&format!("heatmap:{name}"));
        let center_x = rng.gen_range(30.0..75.0);
        let center_y = rng.gen_range(20.0..48.0);
        let mut sample = HeatmapSample {
            x: Vec::with_capacity(HEATMAP_POINTS),
            y: Vec::with_capacity(HEATMAP_POINTS),
        };
        for _ in 0..HEATMAP_POINTS {
            let x = (center_x + 15.0 * gaussian(&mut rng)).clamp(0.0, FIELD_LENGTH);
            let y = (center_y + 10.0 * gaussian(&mut rng)).clamp(0.0, FIELD_WIDTH);
            sample.x.push(x);
            sample.y.push(y);
        }
        Ok(sample)
    }

    fn feature_importance(&self) -> Result<FeatureImportance> {
        Ok(FeatureImportance {
            features: FEATURE_WEIGHTS.iter().map(|(f, _)| f.to_string()).collect(),
            importance: FEATURE_WEIGHTS.iter().map(|(_, w)| *w).collect(),
        })
    }

    fn predict(&self, input: &PredictionInput) -> Result<PredictionResponse> {
        let rating = performance_rating(
            input.goals.max(0) as f64,
            input.assists.max(0) as f64,
            input.shots.max(0) as f64,
            input.shots_on_target.max(0) as f64,
            input.pass_accuracy,
            input.tackles.max(0) as f64,
            input.interceptions.max(0) as f64,
            input.dribbles_completed.max(0) as f64,
        );
        Ok(PredictionResponse {
            status: Some("success".to_string()),
            prediction: Some(DisplayValue::Number(round_to(rating, 2))),
            error: None,
        })
    }
}

fn build_snapshot(
    name: &str,
    role: Role,
    lines: &[MatchLine],
    rng: &mut StdRng,
) -> PlayerSnapshot {
    let n = lines.len().max(1) as f64;
    let sum = |f: fn(&MatchLine) -> f64| total(lines, f);
    let mean = |f: fn(&MatchLine) -> f64| round_to(total(lines, f) / n, 2);

    let total_shots = sum(|m| m.shots as f64);
    let total_on_target = sum(|m| m.shots_on_target as f64);
    let age = rng.gen_range(19..34);
    let height = rng.gen_range(170..195);
    let weight = rng.gen_range(64..90);

    PlayerSnapshot {
        player_name: Some(name.to_string()),
        full_name: Some(DisplayValue::from(name)),
        photo_url: Some(String::new()),
        birth_date: Some(DisplayValue::from(format!("{}-03-14", 2025 - age).as_str())),
        age: Some(DisplayValue::Number(age as f64)),
        nationality: Some(DisplayValue::from("England")),
        position: Some(DisplayValue::from(role.label())),
        positions_full: Some(DisplayValue::from(role.label())),
        height_cm: Some(DisplayValue::from(format!("{height} cm").as_str())),
        weight_kg: Some(DisplayValue::from(format!("{weight} kg").as_str())),
        overall_rating: Some(DisplayValue::Number(rng.gen_range(70..92) as f64)),
        preferred_foot: Some(DisplayValue::from(if rng.gen_bool(0.7) {
            "right"
        } else {
            "left"
        })),
        current_team: Some(DisplayValue::from("Demo XI")),
        total_matches: Some(DisplayValue::Number(lines.len() as f64)),
        avg_performance: Some(DisplayValue::Number(mean(|m| m.rating))),
        total_goals: Some(DisplayValue::Number(sum(|m| m.goals as f64))),
        total_assists: Some(DisplayValue::Number(sum(|m| m.assists as f64))),
        avg_shots: Some(DisplayValue::Number(mean(|m| m.shots as f64))),
        shot_accuracy: Some(DisplayValue::Number(round_to(
            total_on_target / total_shots.max(1.0) * 100.0,
            1,
        ))),
        total_passes: Some(DisplayValue::Number(sum(|m| m.passes_completed as f64))),
        avg_pass_accuracy: Some(DisplayValue::Number(round_to(
            sum(|m| m.pass_accuracy) / n,
            1,
        ))),
        avg_passes_per_match: Some(DisplayValue::Number(round_to(
            sum(|m| m.passes_completed as f64) / n,
            1,
        ))),
        total_tackles: Some(DisplayValue::Number(sum(|m| m.tackles as f64))),
        total_interceptions: Some(DisplayValue::Number(sum(|m| m.interceptions as f64))),
        avg_dribbles: Some(DisplayValue::Number(mean(|m| m.dribbles_completed as f64))),
        radar_stats: RadarStats {
            goals: mean(|m| m.goals as f64),
            assists: mean(|m| m.assists as f64),
            shots_on_target: mean(|m| m.shots_on_target as f64),
            pass_accuracy: mean(|m| m.pass_accuracy),
            tackles: mean(|m| m.tackles as f64),
            interceptions: mean(|m| m.interceptions as f64),
            dribbles_completed: mean(|m| m.dribbles_completed as f64),
        },
        performance_trend: PerformanceTrend {
            matches: (0..lines.len())
                .map(|i| DisplayValue::Number(i as f64))
                .collect(),
            ratings: lines.iter().map(|m| m.rating).collect(),
        },
        recent_matches: lines
            .iter()
            .enumerate()
            .take(RECENT_MATCHES)
            .map(|(i, m)| match_record(i, m))
            .collect(),
    }
}

fn total(lines: &[MatchLine], f: fn(&MatchLine) -> f64) -> f64 {
    lines.iter().map(f).sum()
}

fn match_record(match_id: usize, m: &MatchLine) -> MatchRecord {
    let num = |v: f64| Some(DisplayValue::Number(v));
    MatchRecord {
        match_id: num(match_id as f64),
        goals: num(m.goals as f64),
        assists: num(m.assists as f64),
        passes_completed: num(m.passes_completed as f64),
        pass_accuracy: num(m.pass_accuracy),
        tackles: num(m.tackles as f64),
        interceptions: num(m.interceptions as f64),
        performance_rating: num(m.rating),
    }
}

fn sample_match(rng: &mut StdRng, role: Role) -> MatchLine {
    let (goals, assists, shots, passes, pass_span, tackles, interceptions, dribbles): (
        u32,
        u32,
        u32,
        u32,
        u32,
        u32,
        u32,
        u32,
    ) = match role {
        Role::Forward => (
            poisson(rng, 0.5),
            poisson(rng, 0.3),
            rng.gen_range(2..8),
            rng.gen_range(20..50),
            20,
            rng.gen_range(0..3),
            rng.gen_range(0..3),
            rng.gen_range(2..8),
        ),
        Role::Midfielder => (
            poisson(rng, 0.2),
            poisson(rng, 0.4),
            rng.gen_range(1..5),
            rng.gen_range(40..80),
            25,
            rng.gen_range(2..6),
            rng.gen_range(2..6),
            rng.gen_range(1..5),
        ),
        Role::Defender => (
            poisson(rng, 0.05),
            poisson(rng, 0.1),
            rng.gen_range(0..2),
            rng.gen_range(30..60),
            20,
            rng.gen_range(4..10),
            rng.gen_range(3..8),
            rng.gen_range(0..2),
        ),
        Role::Goalkeeper => (0, 0, 0, rng.gen_range(20..40), 15, 0, rng.gen_range(0..2), 0),
    };
    let shots_on_target = if shots == 0 { 0 } else { rng.gen_range(0..=shots) };
    let attempted = rng.gen_range(passes..passes + pass_span);
    let pass_accuracy = if attempted == 0 {
        0.0
    } else {
        round_to(passes as f64 / attempted as f64 * 100.0, 2)
    };
    let noise = 5.0 * gaussian(rng);
    let rating = (performance_rating(
        goals as f64,
        assists as f64,
        shots as f64,
        shots_on_target as f64,
        pass_accuracy,
        tackles as f64,
        interceptions as f64,
        dribbles as f64,
    ) + noise)
        .clamp(0.0, 100.0);

    MatchLine {
        goals,
        assists,
        shots,
        shots_on_target,
        passes_completed: passes,
        pass_accuracy,
        tackles,
        interceptions,
        dribbles_completed: dribbles,
        rating: round_to(rating, 2),
    }
}

#[allow(clippy::too_many_arguments)]
fn performance_rating(
    goals: f64,
    assists: f64,
    shots: f64,
    shots_on_target: f64,
    pass_accuracy: f64,
    tackles: f64,
    interceptions: f64,
    dribbles: f64,
) -> f64 {
    let rating = goals * 10.0
        + assists * 7.0
        + shots_on_target / shots.max(1.0) * 5.0
        + pass_accuracy * 0.3
        + tackles * 2.0
        + interceptions * 2.0
        + dribbles * 1.5;
    rating.clamp(0.0, 100.0)
}

fn role_for(name: &str) -> Role {
    match name_hash(name) % 4 {
        0 => Role::Forward,
        1 => Role::Midfielder,
        2 => Role::Defender,
        _ => Role::Goalkeeper,
    }
}

fn seeded_rng(key: &str) -> StdRng {
    StdRng::seed_from_u64(name_hash(key))
}

// 64-bit FNV-1a, fixed across toolchains.
fn name_hash(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

// Box-Muller; standard normal.
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

// Knuth's method; fine for the small rates used here.
fn poisson(rng: &mut StdRng, lambda: f64) -> u32 {
    let limit = (-lambda).exp();
    let mut k = 0;
    let mut p = 1.0;
    loop {
        p *= rng.gen_range(0.0..1.0);
        if p <= limit {
            return k;
        }
        k += 1;
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
