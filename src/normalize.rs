use crate::model::RadarStats;

pub const RADAR_AXES: usize = 7;

pub const RADAR_LABELS: [&str; RADAR_AXES] = [
    "Goals",
    "Assists",
    "Shots on Target",
    "Pass Accuracy",
    "Tackles",
    "Interceptions",
    "Dribbles",
];

/// Per-match value that maps to 100 on the radar. `None` means the stat is
/// already a percentage.
pub const REFERENCE_MAX: [Option<f64>; RADAR_AXES] = [
    Some(2.0),
    Some(2.0),
    Some(5.0),
    None,
    Some(8.0),
    Some(8.0),
    Some(5.0),
];

/// Scale raw per-match stats onto the radar's 0-100 axis, in `RADAR_LABELS`
/// order.
///
/// Values above the reference maximum are not clamped: four goals per match
/// plots at 200.
pub fn normalize_radar(stats: &RadarStats) -> [f64; RADAR_AXES] {
    let raw = [
        stats.goals,
        stats.assists,
        stats.shots_on_target,
        stats.pass_accuracy,
        stats.tackles,
        stats.interceptions,
        stats.dribbles_completed,
    ];
    let mut out = [0.0; RADAR_AXES];
    for (i, value) in raw.into_iter().enumerate() {
        out[i] = scale_to_reference(value, REFERENCE_MAX[i]);
    }
    out
}

fn scale_to_reference(value: f64, reference: Option<f64>) -> f64 {
    match reference {
        Some(max) => value / max * 100.0,
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(goals: f64) -> RadarStats {
        RadarStats {
            goals,
            assists: 1.0,
            shots_on_target: 2.5,
            pass_accuracy: 84.3,
            tackles: 4.0,
            interceptions: 2.0,
            dribbles_completed: 5.0,
        }
    }

    #[test]
    fn reference_max_maps_to_hundred() {
        let out = normalize_radar(&stats(2.0));
        assert_eq!(out[0], 100.0);
        assert_eq!(out[1], 50.0);
        assert_eq!(out[2], 50.0);
        assert_eq!(out[3], 84.3);
        assert_eq!(out[4], 50.0);
        assert_eq!(out[5], 25.0);
        assert_eq!(out[6], 100.0);
    }

    #[test]
    fn above_reference_is_not_clamped() {
        let out = normalize_radar(&stats(4.0));
        assert_eq!(out[0], 200.0);
    }

    #[test]
    fn within_reference_stays_in_range() {
        let samples = [0.0, 0.4, 1.0, 1.99, 2.0];
        for g in samples {
            let s = RadarStats {
                goals: g,
                assists: g,
                shots_on_target: g * 2.5,
                pass_accuracy: g * 50.0,
                tackles: g * 4.0,
                interceptions: g * 4.0,
                dribbles_completed: g * 2.5,
            };
            for v in normalize_radar(&s) {
                assert!((0.0..=100.0).contains(&v), "{v} out of range for {g}");
            }
        }
    }
}
