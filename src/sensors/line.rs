// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line position from three reflectance sensors (left, center, right).
//!
//! Each channel is smoothed by a moving average over the last [`LINE_FILTER_LEN`] raw readings.
//! Polarity is detected every cycle so a dark line on a light floor and a light line on a dark
//! floor both come out as "higher = on the line".

use crate::config::{LineConfig, LINE_FILTER_LEN, LINE_SENSOR_COUNT};

/// A source of raw reflectance readings in left/center/right order.
pub trait LineSensor {
    fn read(&mut self) -> [u16; LINE_SENSOR_COUNT];
}

/// Result of one line-tracker update.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LinePosition {
    /// Weighted centroid in `0..=position_max`, or the center when `uniform`.
    pub position: f32,
    /// No line distinguishable: the three adjusted channels are too close together.
    pub uniform: bool,
    /// Line detected as darker than the background (channels were inverted).
    pub line_is_dark: bool,
    /// Moving-average raw readings, before polarity adjustment.
    pub smoothed: [u16; LINE_SENSOR_COUNT],
}

impl LinePosition {
    /// The measured position, or `None` on a uniform surface.
    #[inline]
    pub fn valid_position(&self) -> Option<f32> {
        if self.uniform {
            None
        } else {
            Some(self.position)
        }
    }
}

/// Moving-average smoothing and centroid computation for the reflectance array.
#[derive(Clone, Debug)]
pub struct LineTracker {
    cfg: LineConfig,
    history: [[u16; LINE_FILTER_LEN]; LINE_SENSOR_COUNT],
    idx: usize,
    primed: bool,
    last: LinePosition,
}

impl LineTracker {
    pub fn new(cfg: LineConfig) -> Self {
        Self {
            cfg,
            history: [[0; LINE_FILTER_LEN]; LINE_SENSOR_COUNT],
            idx: 0,
            primed: false,
            last: LinePosition {
                position: cfg.center(),
                uniform: true,
                ..Default::default()
            },
        }
    }

    #[inline]
    pub fn last(&self) -> LinePosition {
        self.last
    }

    /// Push one raw reading per channel and recompute the position.
    pub fn update(&mut self, raw: [u16; LINE_SENSOR_COUNT]) -> LinePosition {
        if !self.primed {
            // Fill the window with the first reading so the average starts meaningful.
            for (hist, &r) in self.history.iter_mut().zip(raw.iter()) {
                *hist = [r; LINE_FILTER_LEN];
            }
            self.primed = true;
        } else {
            for (hist, &r) in self.history.iter_mut().zip(raw.iter()) {
                hist[self.idx] = r;
            }
        }
        self.idx = (self.idx + 1) % LINE_FILTER_LEN;

        let mut smoothed = [0u16; LINE_SENSOR_COUNT];
        for (s, hist) in smoothed.iter_mut().zip(self.history.iter()) {
            let sum: u32 = hist.iter().map(|&v| v as u32).sum();
            *s = (sum / LINE_FILTER_LEN as u32) as u16;
        }

        self.last = self.locate(smoothed);
        self.last
    }

    fn locate(&self, smoothed: [u16; LINE_SENSOR_COUNT]) -> LinePosition {
        let full_scale = self.cfg.sensor_max as u32;
        let mean = smoothed.iter().map(|&v| v as u32).sum::<u32>() / LINE_SENSOR_COUNT as u32;
        let line_is_dark = mean < full_scale / 2;

        let mut adjusted = [0u32; LINE_SENSOR_COUNT];
        for (a, &s) in adjusted.iter_mut().zip(smoothed.iter()) {
            let v = (s as u32).min(full_scale);
            *a = if line_is_dark { full_scale - v } else { v };
        }

        let max = adjusted.iter().copied().max().unwrap_or(0);
        let min = adjusted.iter().copied().min().unwrap_or(0);
        let total: u32 = adjusted.iter().sum();

        let center = self.cfg.center();
        if max - min < self.cfg.uniform_threshold as u32 || total == 0 {
            return LinePosition {
                position: center,
                uniform: true,
                line_is_dark,
                smoothed,
            };
        }

        // Fixed weights: left = 0, center = mid, right = max.
        let weights = [0.0, center, self.cfg.position_max as f32];
        let weighted: f32 = adjusted
            .iter()
            .zip(weights.iter())
            .map(|(&a, &w)| a as f32 * w)
            .sum();

        LinePosition {
            position: weighted / total as f32,
            uniform: false,
            line_is_dark,
            smoothed,
        }
    }
}
