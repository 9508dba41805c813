use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::model::{PredictionInput, PredictionResponse};
use crate::view::{ViewSurface, ViewTarget};

pub const EMPHASIS_SCALE: f32 = 1.2;
pub const EMPHASIS_HOLD: Duration = Duration::from_millis(300);

pub const PREDICTION_FAILED_ALERT: &str = "Failed to make prediction. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PredictionField {
    MinutesPlayed,
    Goals,
    Assists,
    Shots,
    ShotsOnTarget,
    PassesCompleted,
    PassAccuracy,
    Tackles,
    Interceptions,
    DribblesCompleted,
}

/// Bounds and starting value for one slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl PredictionField {
    pub const ALL: [PredictionField; 10] = [
        PredictionField::MinutesPlayed,
        PredictionField::Goals,
        PredictionField::Assists,
        PredictionField::Shots,
        PredictionField::ShotsOnTarget,
        PredictionField::PassesCompleted,
        PredictionField::PassAccuracy,
        PredictionField::Tackles,
        PredictionField::Interceptions,
        PredictionField::DribblesCompleted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PredictionField::MinutesPlayed => "Minutes Played",
            PredictionField::Goals => "Goals",
            PredictionField::Assists => "Assists",
            PredictionField::Shots => "Shots",
            PredictionField::ShotsOnTarget => "Shots on Target",
            PredictionField::PassesCompleted => "Passes Completed",
            PredictionField::PassAccuracy => "Pass Accuracy (%)",
            PredictionField::Tackles => "Tackles",
            PredictionField::Interceptions => "Interceptions",
            PredictionField::DribblesCompleted => "Dribbles Completed",
        }
    }

    pub fn input_id(self) -> &'static str {
        match self {
            PredictionField::MinutesPlayed => "predMinutes",
            PredictionField::Goals => "predGoals",
            PredictionField::Assists => "predAssists",
            PredictionField::Shots => "predShots",
            PredictionField::ShotsOnTarget => "predShotsTarget",
            PredictionField::PassesCompleted => "predPasses",
            PredictionField::PassAccuracy => "predPassAcc",
            PredictionField::Tackles => "predTackles",
            PredictionField::Interceptions => "predInterceptions",
            PredictionField::DribblesCompleted => "predDribbles",
        }
    }

    pub fn readout_id(self) -> &'static str {
        match self {
            PredictionField::MinutesPlayed => "predMinutesValue",
            PredictionField::Goals => "predGoalsValue",
            PredictionField::Assists => "predAssistsValue",
            PredictionField::Shots => "predShotsValue",
            PredictionField::ShotsOnTarget => "predShotsTargetValue",
            PredictionField::PassesCompleted => "predPassesValue",
            PredictionField::PassAccuracy => "predPassAccValue",
            PredictionField::Tackles => "predTacklesValue",
            PredictionField::Interceptions => "predInterceptionsValue",
            PredictionField::DribblesCompleted => "predDribblesValue",
        }
    }

    /// Defaults mirror the backend's fallbacks for omitted fields.
    pub fn slider(self) -> SliderSpec {
        let (min, max, step, default) = match self {
            PredictionField::MinutesPlayed => (0.0, 120.0, 1.0, 90.0),
            PredictionField::Goals => (0.0, 5.0, 1.0, 0.0),
            PredictionField::Assists => (0.0, 5.0, 1.0, 0.0),
            PredictionField::Shots => (0.0, 15.0, 1.0, 0.0),
            PredictionField::ShotsOnTarget => (0.0, 10.0, 1.0, 0.0),
            PredictionField::PassesCompleted => (0.0, 150.0, 1.0, 50.0),
            PredictionField::PassAccuracy => (0.0, 100.0, 0.5, 85.0),
            PredictionField::Tackles => (0.0, 15.0, 1.0, 3.0),
            PredictionField::Interceptions => (0.0, 15.0, 1.0, 3.0),
            PredictionField::DribblesCompleted => (0.0, 15.0, 1.0, 2.0),
        };
        SliderSpec {
            min,
            max,
            step,
            default,
        }
    }

    pub fn is_integer(self) -> bool {
        self != PredictionField::PassAccuracy
    }
}

/// Raw control values, kept as text the way input controls report them.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionForm {
    values: [String; 10],
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionForm {
    pub fn new() -> Self {
        Self {
            values: PredictionField::ALL.map(|f| crate::model::format_number(f.slider().default)),
        }
    }

    pub fn value(&self, field: PredictionField) -> &str {
        &self.values[field as usize]
    }

    /// Record an input event and mirror it into the field's readout.
    pub fn on_input<S>(&mut self, field: PredictionField, raw: &str, surface: &mut S)
    where
        S: ViewSurface + ?Sized,
    {
        self.values[field as usize] = raw.to_string();
        let readout = ViewTarget::PredictionReadout(field);
        if surface.has_target(ViewTarget::PredictionInput(field)) && surface.has_target(readout) {
            surface.set_text(readout, raw);
        }
    }

    /// Move a slider by `steps` increments, clamped to its bounds.
    pub fn nudge<S>(&mut self, field: PredictionField, steps: i32, surface: &mut S)
    where
        S: ViewSurface + ?Sized,
    {
        let spec = field.slider();
        let current = parse_float_prefix(self.value(field)).unwrap_or(spec.default);
        let next = (current + spec.step * steps as f64).clamp(spec.min, spec.max);
        let raw = crate::model::format_number(next);
        self.on_input(field, &raw, surface);
    }

    /// Coerce every control: nine integers and one float percentage.
    pub fn collect(&self) -> Result<PredictionInput> {
        let int = |field: PredictionField| -> Result<i64> {
            parse_int_prefix(self.value(field))
                .ok_or_else(|| anyhow!("{} is not a number", field.label()))
        };
        let pass_accuracy = parse_float_prefix(self.value(PredictionField::PassAccuracy))
            .with_context(|| format!("{} is not a number", PredictionField::PassAccuracy.label()))?;

        Ok(PredictionInput {
            minutes_played: int(PredictionField::MinutesPlayed)?,
            goals: int(PredictionField::Goals)?,
            assists: int(PredictionField::Assists)?,
            shots: int(PredictionField::Shots)?,
            shots_on_target: int(PredictionField::ShotsOnTarget)?,
            passes_completed: int(PredictionField::PassesCompleted)?,
            pass_accuracy,
            tackles: int(PredictionField::Tackles)?,
            interceptions: int(PredictionField::Interceptions)?,
            dribbles_completed: int(PredictionField::DribblesCompleted)?,
        })
    }
}

/// What the result view should show for a finished prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Value(String),
    Rejected(String),
}

impl PredictionOutcome {
    pub fn from_response(response: &PredictionResponse) -> Self {
        if response.is_success() {
            let text = response
                .prediction
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            return PredictionOutcome::Value(text);
        }
        let reason = response
            .error
            .clone()
            .or_else(|| response.status.clone().map(|s| format!("status {s}")))
            .unwrap_or_else(|| "no status in response".to_string());
        PredictionOutcome::Rejected(format!("Prediction was not accepted: {reason}"))
    }
}

/// Write a prediction outcome to the surface. Success updates the result
/// view with a short emphasis; a rejection raises an alert.
pub fn show_outcome<S>(outcome: &PredictionOutcome, surface: &mut S)
where
    S: ViewSurface + ?Sized,
{
    match outcome {
        PredictionOutcome::Value(text) => {
            if surface.has_target(ViewTarget::PredictionResult) {
                surface.set_text(ViewTarget::PredictionResult, text);
                surface.emphasize(ViewTarget::PredictionResult, EMPHASIS_SCALE, EMPHASIS_HOLD);
            }
        }
        PredictionOutcome::Rejected(message) => surface.alert(message),
    }
}

/// Leading-integer parse: `"12.7"` -> 12, `" 3x"` -> 3, `"x"` -> None.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = split_sign(s);
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

/// Leading-float parse: `"85.5%"` -> 85.5, `".5"` -> 0.5, `"-"` -> None.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let (sign, rest) = split_sign(s);
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in rest.char_indices() {
        if c.is_ascii_digit() {
            seen_digit = true;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    rest[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .map(|v| sign as f64 * v)
}

fn split_sign(s: &str) -> (i64, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (-1, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (1, rest)
    } else {
        (1, s)
    }
}
