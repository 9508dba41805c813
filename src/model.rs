use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A loosely typed scalar from the backend, rendered the way a browser
/// renders a JSON scalar into text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl DisplayValue {
    /// `0`, `NaN`, `""` and `false` count as absent for `||`-style fallbacks.
    pub fn is_truthy(&self) -> bool {
        match self {
            DisplayValue::Bool(b) => *b,
            DisplayValue::Number(n) => *n != 0.0 && !n.is_nan(),
            DisplayValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DisplayValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            DisplayValue::Number(n) => Some(*n),
            DisplayValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl From<f64> for DisplayValue {
    fn from(value: f64) -> Self {
        DisplayValue::Number(value)
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        DisplayValue::Text(value.to_string())
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Bool(b) => write!(f, "{b}"),
            DisplayValue::Number(n) => f.write_str(&format_number(*n)),
            DisplayValue::Text(s) => f.write_str(s),
        }
    }
}

/// Integral values print without a fractional part (`42.0` -> `"42"`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 {
        return format!("{n:.0}");
    }
    format!("{n}")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerSnapshot {
    pub player_name: Option<String>,
    pub full_name: Option<DisplayValue>,
    pub photo_url: Option<String>,
    pub birth_date: Option<DisplayValue>,
    pub age: Option<DisplayValue>,
    pub nationality: Option<DisplayValue>,
    pub position: Option<DisplayValue>,
    pub positions_full: Option<DisplayValue>,
    pub height_cm: Option<DisplayValue>,
    pub weight_kg: Option<DisplayValue>,
    pub overall_rating: Option<DisplayValue>,
    pub preferred_foot: Option<DisplayValue>,
    pub current_team: Option<DisplayValue>,

    pub total_matches: Option<DisplayValue>,
    pub avg_performance: Option<DisplayValue>,
    pub total_goals: Option<DisplayValue>,
    pub total_assists: Option<DisplayValue>,

    pub avg_shots: Option<DisplayValue>,
    pub shot_accuracy: Option<DisplayValue>,
    pub total_passes: Option<DisplayValue>,
    pub avg_pass_accuracy: Option<DisplayValue>,
    pub avg_passes_per_match: Option<DisplayValue>,
    pub total_tackles: Option<DisplayValue>,
    pub total_interceptions: Option<DisplayValue>,
    pub avg_dribbles: Option<DisplayValue>,

    pub radar_stats: RadarStats,
    pub performance_trend: PerformanceTrend,
    pub recent_matches: Vec<MatchRecord>,
}

/// Per-match averages feeding the radar chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RadarStats {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub goals: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub assists: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shots_on_target: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pass_accuracy: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tackles: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub interceptions: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dribbles_completed: f64,
}

/// Parallel sequences: `matches[i]` is the label for `ratings[i]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PerformanceTrend {
    #[serde(default)]
    pub matches: Vec<DisplayValue>,
    #[serde(default)]
    pub ratings: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchRecord {
    pub match_id: Option<DisplayValue>,
    pub goals: Option<DisplayValue>,
    pub assists: Option<DisplayValue>,
    pub passes_completed: Option<DisplayValue>,
    pub pass_accuracy: Option<DisplayValue>,
    pub tackles: Option<DisplayValue>,
    pub interceptions: Option<DisplayValue>,
    pub performance_rating: Option<DisplayValue>,
}

/// Touch positions on a 105x68 pitch; `x[i]` pairs with `y[i]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HeatmapSample {
    #[serde(default)]
    pub x: Vec<f64>,
    #[serde(default)]
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureImportance {
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub importance: Vec<f64>,
}

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionInput {
    pub minutes_played: i64,
    pub goals: i64,
    pub assists: i64,
    pub shots: i64,
    pub shots_on_target: i64,
    pub passes_completed: i64,
    pub pass_accuracy: f64,
    pub tackles: i64,
    pub interceptions: i64,
    pub dribbles_completed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictionResponse {
    pub status: Option<String>,
    pub prediction: Option<DisplayValue>,
    pub error: Option<String>,
}

impl PredictionResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

// Missing or null counts as 0; unparseable text as NaN.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<DisplayValue>::deserialize(deserializer)?;
    Ok(match raw {
        None => 0.0,
        Some(value) => value.as_f64().unwrap_or(f64::NAN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(7.25), "7.25");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn truthiness_matches_fallback_rules() {
        assert!(!DisplayValue::Number(0.0).is_truthy());
        assert!(!DisplayValue::Text(String::new()).is_truthy());
        assert!(DisplayValue::Text("180 cm".to_string()).is_truthy());
        assert!(DisplayValue::Number(27.0).is_truthy());
    }

    #[test]
    fn radar_accepts_null_and_numeric_strings() {
        let raw = r#"{"goals": null, "assists": "0.5", "tackles": 4}"#;
        let stats: RadarStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.goals, 0.0);
        assert_eq!(stats.assists, 0.5);
        assert_eq!(stats.tackles, 4.0);
        assert_eq!(stats.dribbles_completed, 0.0);
    }
}
