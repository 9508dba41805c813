use anyhow::{Result, anyhow};

use crate::model::HeatmapSample;

pub const FIELD_LENGTH: f64 = 105.0;
pub const FIELD_WIDTH: f64 = 68.0;
pub const DEFAULT_BINS_X: usize = 30;
pub const DEFAULT_BINS_Y: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldMarking {
    Rect { x0: f64, y0: f64, x1: f64, y1: f64 },
    Line { x0: f64, y0: f64, x1: f64, y1: f64 },
}

pub const FIELD_MARKINGS: [FieldMarking; 6] = [
    FieldMarking::Rect {
        x0: 0.0,
        y0: 0.0,
        x1: FIELD_LENGTH,
        y1: FIELD_WIDTH,
    },
    FieldMarking::Line {
        x0: 52.5,
        y0: 0.0,
        x1: 52.5,
        y1: FIELD_WIDTH,
    },
    // Penalty areas.
    FieldMarking::Rect {
        x0: 0.0,
        y0: 13.84,
        x1: 16.5,
        y1: 54.16,
    },
    FieldMarking::Rect {
        x0: 88.5,
        y0: 13.84,
        x1: FIELD_LENGTH,
        y1: 54.16,
    },
    // Goal areas.
    FieldMarking::Rect {
        x0: 0.0,
        y0: 24.84,
        x1: 5.5,
        y1: 43.16,
    },
    FieldMarking::Rect {
        x0: 99.5,
        y0: 24.84,
        x1: FIELD_LENGTH,
        y1: 43.16,
    },
];

/// Touch counts binned over the pitch. Row 0 is the `y = 0` touchline.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub bins_x: usize,
    pub bins_y: usize,
    pub counts: Vec<u32>,
    pub peak: u32,
    pub dropped: usize,
}

impl HeatmapGrid {
    pub fn count(&self, ix: usize, iy: usize) -> u32 {
        if ix >= self.bins_x || iy >= self.bins_y {
            return 0;
        }
        self.counts[iy * self.bins_x + ix]
    }

    /// Cell density relative to the busiest cell, in `0.0..=1.0`.
    pub fn intensity(&self, ix: usize, iy: usize) -> f64 {
        if self.peak == 0 {
            return 0.0;
        }
        self.count(ix, iy) as f64 / self.peak as f64
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| *c as u64).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPlot {
    pub grid: HeatmapGrid,
    pub markings: &'static [FieldMarking],
    pub opacity: f32,
}

impl HeatmapPlot {
    pub fn from_sample(sample: &HeatmapSample) -> Result<Self> {
        Ok(Self {
            grid: bin_heatmap(sample, DEFAULT_BINS_X, DEFAULT_BINS_Y)?,
            markings: &FIELD_MARKINGS,
            opacity: 0.7,
        })
    }
}

/// 2-D histogram of touch positions. Points off the pitch or non-finite are
/// counted in `dropped`.
pub fn bin_heatmap(sample: &HeatmapSample, bins_x: usize, bins_y: usize) -> Result<HeatmapGrid> {
    if bins_x == 0 || bins_y == 0 {
        return Err(anyhow!("heatmap needs at least one bin per axis"));
    }
    if sample.x.len() != sample.y.len() {
        return Err(anyhow!(
            "heatmap coordinate length mismatch: x={} y={}",
            sample.x.len(),
            sample.y.len()
        ));
    }

    let mut counts = vec![0u32; bins_x * bins_y];
    let mut dropped = 0usize;
    for (&x, &y) in sample.x.iter().zip(sample.y.iter()) {
        let (Some(ix), Some(iy)) = (
            bin_index(x, FIELD_LENGTH, bins_x),
            bin_index(y, FIELD_WIDTH, bins_y),
        ) else {
            dropped += 1;
            continue;
        };
        counts[iy * bins_x + ix] += 1;
    }
    let peak = counts.iter().copied().max().unwrap_or(0);

    Ok(HeatmapGrid {
        bins_x,
        bins_y,
        counts,
        peak,
        dropped,
    })
}

fn bin_index(value: f64, extent: f64, bins: usize) -> Option<usize> {
    if !value.is_finite() || !(0.0..=extent).contains(&value) {
        return None;
    }
    // The far edge belongs to the last bin.
    let idx = (value / extent * bins as f64).floor() as usize;
    Some(idx.min(bins - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_edges_and_drops_outside() {
        let sample = HeatmapSample {
            x: vec![0.0, 105.0, 52.5, 120.0, f64::NAN],
            y: vec![0.0, 68.0, 34.0, 10.0, 10.0],
        };
        let grid = bin_heatmap(&sample, 30, 20).unwrap();
        assert_eq!(grid.count(0, 0), 1);
        assert_eq!(grid.count(29, 19), 1);
        assert_eq!(grid.count(15, 10), 1);
        assert_eq!(grid.dropped, 2);
        assert_eq!(grid.total(), 3);
        assert_eq!(grid.peak, 1);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let sample = HeatmapSample {
            x: vec![1.0, 2.0],
            y: vec![1.0],
        };
        assert!(bin_heatmap(&sample, 30, 20).is_err());
    }

    #[test]
    fn intensity_is_relative_to_peak() {
        let sample = HeatmapSample {
            x: vec![1.0, 1.0, 1.0, 60.0],
            y: vec![1.0, 1.0, 1.0, 30.0],
        };
        let grid = bin_heatmap(&sample, 10, 10).unwrap();
        assert_eq!(grid.peak, 3);
        assert_eq!(grid.intensity(0, 0), 1.0);
        assert!((grid.intensity(5, 4) - 1.0 / 3.0).abs() < 1e-9);
    }
}
