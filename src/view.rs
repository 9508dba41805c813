use std::time::Duration;

use crate::heatmap::HeatmapPlot;
use crate::model::{DisplayValue, MatchRecord, PlayerSnapshot};
use crate::prediction::PredictionField;

/// Named places on the dashboard that data can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewTarget {
    PlayerPhoto,
    PlayerFullName,
    PlayerBirthdate,
    PlayerAge,
    PlayerNationality,
    PlayerPosition,
    PlayerHeight,
    PlayerWeight,
    PlayerRating,
    PlayerFoot,

    StatPosition,
    StatMatches,
    StatPerformance,
    StatGoals,
    StatAssists,

    DetailGoals,
    DetailAssists,
    DetailShots,
    DetailShotAccuracy,
    DetailPasses,
    DetailPassAcc,
    DetailAvgPasses,
    DetailTackles,
    DetailInterceptions,
    DetailDribbles,

    RadarCanvas,
    TrendCanvas,
    ImportanceCanvas,
    HeatmapContainer,
    MatchesTable,

    PredictionInput(PredictionField),
    PredictionReadout(PredictionField),
    PredictionResult,

    Dashboard,
    LoadingIndicator,
}

impl ViewTarget {
    pub const PROFILE: [ViewTarget; 10] = [
        ViewTarget::PlayerPhoto,
        ViewTarget::PlayerFullName,
        ViewTarget::PlayerBirthdate,
        ViewTarget::PlayerAge,
        ViewTarget::PlayerNationality,
        ViewTarget::PlayerPosition,
        ViewTarget::PlayerHeight,
        ViewTarget::PlayerWeight,
        ViewTarget::PlayerRating,
        ViewTarget::PlayerFoot,
    ];

    pub const STAT_CARDS: [ViewTarget; 5] = [
        ViewTarget::StatPosition,
        ViewTarget::StatMatches,
        ViewTarget::StatPerformance,
        ViewTarget::StatGoals,
        ViewTarget::StatAssists,
    ];

    pub const DETAILS: [ViewTarget; 10] = [
        ViewTarget::DetailGoals,
        ViewTarget::DetailAssists,
        ViewTarget::DetailShots,
        ViewTarget::DetailShotAccuracy,
        ViewTarget::DetailPasses,
        ViewTarget::DetailPassAcc,
        ViewTarget::DetailAvgPasses,
        ViewTarget::DetailTackles,
        ViewTarget::DetailInterceptions,
        ViewTarget::DetailDribbles,
    ];

    /// Element id used by the HTML dashboard for this target.
    pub fn element_id(self) -> &'static str {
        match self {
            ViewTarget::PlayerPhoto => "playerPhoto",
            ViewTarget::PlayerFullName => "playerFullName",
            ViewTarget::PlayerBirthdate => "playerBirthdate",
            ViewTarget::PlayerAge => "playerAge",
            ViewTarget::PlayerNationality => "playerNationality",
            ViewTarget::PlayerPosition => "playerPosition",
            ViewTarget::PlayerHeight => "playerHeight",
            ViewTarget::PlayerWeight => "playerWeight",
            ViewTarget::PlayerRating => "playerRating",
            ViewTarget::PlayerFoot => "playerFoot",
            ViewTarget::StatPosition => "statPosition",
            ViewTarget::StatMatches => "statMatches",
            ViewTarget::StatPerformance => "statPerformance",
            ViewTarget::StatGoals => "statGoals",
            ViewTarget::StatAssists => "statAssists",
            ViewTarget::DetailGoals => "detailGoals",
            ViewTarget::DetailAssists => "detailAssists",
            ViewTarget::DetailShots => "detailShots",
            ViewTarget::DetailShotAccuracy => "detailShotAccuracy",
            ViewTarget::DetailPasses => "detailPasses",
            ViewTarget::DetailPassAcc => "detailPassAcc",
            ViewTarget::DetailAvgPasses => "detailAvgPasses",
            ViewTarget::DetailTackles => "detailTackles",
            ViewTarget::DetailInterceptions => "detailInterceptions",
            ViewTarget::DetailDribbles => "detailDribbles",
            ViewTarget::RadarCanvas => "radarChart",
            ViewTarget::TrendCanvas => "trendChart",
            ViewTarget::ImportanceCanvas => "importanceChart",
            ViewTarget::HeatmapContainer => "heatmapContainer",
            ViewTarget::MatchesTable => "matchesTableBody",
            ViewTarget::PredictionInput(field) => field.input_id(),
            ViewTarget::PredictionReadout(field) => field.readout_id(),
            ViewTarget::PredictionResult => "predictionValue",
            ViewTarget::Dashboard => "playerDashboard",
            ViewTarget::LoadingIndicator => "loadingSpinner",
        }
    }
}

/// Capability interface over whatever renders the dashboard.
///
/// Writers must check `has_target` first; surfaces may ignore writes to
/// targets they do not have.
pub trait ViewSurface {
    fn has_target(&self, target: ViewTarget) -> bool;
    fn set_text(&mut self, target: ViewTarget, text: &str);
    fn set_image(&mut self, target: ViewTarget, src: &str, alt: &str);
    fn set_visible(&mut self, target: ViewTarget, visible: bool);
    fn replace_rows(&mut self, target: ViewTarget, rows: Vec<Vec<String>>);
    fn plot_heatmap(&mut self, target: ViewTarget, plot: &HeatmapPlot);
    /// Scale the target up, then back to normal after `hold`.
    fn emphasize(&mut self, target: ViewTarget, scale: f32, hold: Duration);
    /// Blocking user-visible notification.
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    Percent,
    Suffix(&'static str),
}

impl Format {
    pub fn apply(self, value: &DisplayValue) -> String {
        match self {
            Format::Plain => value.to_string(),
            Format::Percent => format!("{value}%"),
            Format::Suffix(suffix) => format!("{value}{suffix}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Only null or missing falls back.
    Defined,
    /// `0`, `""` and `false` fall back too.
    Truthy,
}

pub struct FieldBinding<R> {
    pub target: ViewTarget,
    pub read: fn(&R) -> Option<DisplayValue>,
    pub format: Format,
    pub presence: Presence,
    pub fallback: &'static str,
}

impl<R> FieldBinding<R> {
    pub fn new(target: ViewTarget, read: fn(&R) -> Option<DisplayValue>) -> Self {
        Self {
            target,
            read,
            format: Format::Plain,
            presence: Presence::Defined,
            fallback: "-",
        }
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn truthy(mut self) -> Self {
        self.presence = Presence::Truthy;
        self
    }

    pub fn fallback(mut self, fallback: &'static str) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn render(&self, record: &R) -> String {
        let value = (self.read)(record).filter(|v| match self.presence {
            Presence::Defined => true,
            Presence::Truthy => v.is_truthy(),
        });
        match value {
            Some(v) => self.format.apply(&v),
            None => self.fallback.to_string(),
        }
    }
}

/// Write every binding whose target exists; returns the number of writes.
pub fn bind<R, S>(record: &R, bindings: &[FieldBinding<R>], surface: &mut S) -> usize
where
    S: ViewSurface + ?Sized,
{
    let mut writes = 0;
    for binding in bindings {
        if !surface.has_target(binding.target) {
            continue;
        }
        surface.set_text(binding.target, &binding.render(record));
        writes += 1;
    }
    writes
}

pub type SnapshotBinding = FieldBinding<PlayerSnapshot>;

/// Profile panel. Only bound when the photo target exists.
pub fn profile_bindings() -> Vec<SnapshotBinding> {
    vec![
        SnapshotBinding::new(ViewTarget::PlayerFullName, |p| {
            p.full_name
                .clone()
                .filter(DisplayValue::is_truthy)
                .or_else(|| p.player_name.as_deref().map(DisplayValue::from))
        })
        .fallback(""),
        SnapshotBinding::new(ViewTarget::PlayerBirthdate, |p| p.birth_date.clone())
            .truthy()
            .fallback("Unknown"),
        SnapshotBinding::new(ViewTarget::PlayerAge, |p| p.age.clone())
            .format(Format::Suffix(" years"))
            .truthy()
            .fallback("Unknown"),
        SnapshotBinding::new(ViewTarget::PlayerNationality, |p| p.nationality.clone())
            .truthy()
            .fallback("Unknown"),
        SnapshotBinding::new(ViewTarget::PlayerPosition, |p| {
            p.positions_full
                .clone()
                .filter(DisplayValue::is_truthy)
                .or_else(|| p.position.clone())
        })
        .truthy()
        .fallback("Unknown"),
        SnapshotBinding::new(ViewTarget::PlayerHeight, |p| p.height_cm.clone())
            .truthy()
            .fallback("Unknown"),
        SnapshotBinding::new(ViewTarget::PlayerWeight, |p| p.weight_kg.clone())
            .truthy()
            .fallback("Unknown"),
        SnapshotBinding::new(ViewTarget::PlayerRating, |p| p.overall_rating.clone())
            .truthy()
            .fallback("-"),
        SnapshotBinding::new(ViewTarget::PlayerFoot, |p| p.preferred_foot.clone())
            .truthy()
            .fallback("Unknown"),
    ]
}

pub fn stat_card_bindings() -> Vec<SnapshotBinding> {
    vec![
        SnapshotBinding::new(ViewTarget::StatPosition, |p| p.position.clone()),
        SnapshotBinding::new(ViewTarget::StatMatches, |p| p.total_matches.clone()),
        SnapshotBinding::new(ViewTarget::StatPerformance, |p| p.avg_performance.clone()),
        SnapshotBinding::new(ViewTarget::StatGoals, |p| p.total_goals.clone()),
        SnapshotBinding::new(ViewTarget::StatAssists, |p| p.total_assists.clone()),
    ]
}

pub fn detail_bindings() -> Vec<SnapshotBinding> {
    vec![
        SnapshotBinding::new(ViewTarget::DetailGoals, |p| p.total_goals.clone()),
        SnapshotBinding::new(ViewTarget::DetailAssists, |p| p.total_assists.clone()),
        SnapshotBinding::new(ViewTarget::DetailShots, |p| p.avg_shots.clone()),
        SnapshotBinding::new(ViewTarget::DetailShotAccuracy, |p| p.shot_accuracy.clone())
            .format(Format::Percent),
        SnapshotBinding::new(ViewTarget::DetailPasses, |p| p.total_passes.clone()),
        SnapshotBinding::new(ViewTarget::DetailPassAcc, |p| p.avg_pass_accuracy.clone())
            .format(Format::Percent),
        SnapshotBinding::new(ViewTarget::DetailAvgPasses, |p| p.avg_passes_per_match.clone()),
        SnapshotBinding::new(ViewTarget::DetailTackles, |p| p.total_tackles.clone()),
        SnapshotBinding::new(ViewTarget::DetailInterceptions, |p| {
            p.total_interceptions.clone()
        }),
        SnapshotBinding::new(ViewTarget::DetailDribbles, |p| p.avg_dribbles.clone()),
    ]
}

/// Profile photo plus the profile panel, then the stat cards.
pub fn bind_player_info<S>(snapshot: &PlayerSnapshot, surface: &mut S) -> usize
where
    S: ViewSurface + ?Sized,
{
    let mut writes = 0;
    if surface.has_target(ViewTarget::PlayerPhoto) {
        if let Some(url) = snapshot.photo_url.as_deref().filter(|u| !u.is_empty()) {
            let alt = snapshot.player_name.as_deref().unwrap_or_default();
            surface.set_image(ViewTarget::PlayerPhoto, url, alt);
            writes += 1;
        }
        writes += bind(snapshot, &profile_bindings(), surface);
    }
    writes + bind(snapshot, &stat_card_bindings(), surface)
}

pub fn match_row(record: &MatchRecord) -> Vec<String> {
    let cell = |value: &Option<DisplayValue>, format: Format| {
        value
            .as_ref()
            .map(|v| format.apply(v))
            .unwrap_or_else(|| "-".to_string())
    };
    vec![
        format!("Match {}", cell(&record.match_id, Format::Plain)),
        cell(&record.goals, Format::Plain),
        cell(&record.assists, Format::Plain),
        cell(&record.passes_completed, Format::Plain),
        cell(&record.pass_accuracy, Format::Percent),
        cell(&record.tackles, Format::Plain),
        cell(&record.interceptions, Format::Plain),
        cell(&record.performance_rating, Format::Plain),
    ]
}

pub const MATCH_TABLE_HEADER: [&str; 8] = [
    "Match", "Goals", "Assists", "Passes", "Pass Acc", "Tackles", "Int", "Rating",
];

/// Rebuild the recent-match table from scratch, keeping source order.
pub fn bind_recent_matches<S>(matches: &[MatchRecord], surface: &mut S) -> bool
where
    S: ViewSurface + ?Sized,
{
    if !surface.has_target(ViewTarget::MatchesTable) {
        return false;
    }
    surface.replace_rows(
        ViewTarget::MatchesTable,
        matches.iter().map(match_row).collect(),
    );
    true
}
