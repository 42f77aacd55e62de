// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Accelerometer dead reckoning in the world frame.
//!
//! Body-frame acceleration is rotated by the current yaw and double-integrated. Drift is unbounded,
//! so velocity is zeroed whenever the drive output is zero.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::STANDARD_GRAVITY;

/// Below this magnitude (m/s²) horizontal acceleration is treated as sensor noise.
const ACCEL_NOISE_FLOOR: f32 = 0.05;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DeadReckoning {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

impl DeadReckoning {
    pub const fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Integrate one step.
    ///
    /// `accel_g` is the calibrated body-frame acceleration in g; `moving` is false when every wheel
    /// is commanded to zero, which resets velocity.
    pub fn update(&mut self, accel_g: [f32; 3], yaw_deg: f32, dt: f32, moving: bool) {
        if !moving {
            self.vx = 0.0;
            self.vy = 0.0;
            return;
        }

        let mut bx = accel_g[0] * STANDARD_GRAVITY;
        let mut by = accel_g[1] * STANDARD_GRAVITY;
        if bx.abs() < ACCEL_NOISE_FLOOR {
            bx = 0.0;
        }
        if by.abs() < ACCEL_NOISE_FLOOR {
            by = 0.0;
        }

        let yaw = yaw_deg.to_radians();
        let (s, c) = (yaw.sin(), yaw.cos());
        let ax = bx * c - by * s;
        let ay = bx * s + by * c;

        self.vx += ax * dt;
        self.vy += ay * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }

    #[cfg(test)]
    fn reset(&mut self) {
        *self = Self::new();
    }

    /// World position in metres since the last reset.
    #[inline]
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    #[cfg(test)]
    fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_forward_accel_integrates_along_x() {
        let mut dr = DeadReckoning::new();
        // 0.1 g for one second
        for _ in 0..100 {
            dr.update([0.1, 0.0, 1.0], 0.0, 0.01, true);
        }
        let (x, y) = dr.position();
        let expected = 0.5 * 0.1 * STANDARD_GRAVITY;
        assert!((x - expected).abs() < 0.02, "x = {x}");
        assert!(y.abs() < 1e-4);
    }

    #[test]
    fn yaw_rotates_into_world_frame() {
        let mut dr = DeadReckoning::new();
        for _ in 0..100 {
            dr.update([0.1, 0.0, 1.0], 90.0, 0.01, true);
        }
        let (x, y) = dr.position();
        assert!(x.abs() < 0.01, "x = {x}");
        assert!(y > 0.4);
    }

    #[test]
    fn stationary_resets_velocity_but_keeps_position() {
        let mut dr = DeadReckoning::new();
        for _ in 0..10 {
            dr.update([0.2, 0.0, 1.0], 0.0, 0.01, true);
        }
        let before = dr.position();
        dr.update([0.2, 0.0, 1.0], 0.0, 0.01, false);
        assert_eq!(dr.velocity(), (0.0, 0.0));
        assert_eq!(dr.position(), before);

        dr.reset();
        assert_eq!(dr.position(), (0.0, 0.0));
    }

    #[test]
    fn noise_floor_suppresses_drift() {
        let mut dr = DeadReckoning::new();
        for _ in 0..1000 {
            dr.update([0.002, -0.003, 1.0], 0.0, 0.01, true);
        }
        assert_eq!(dr.position(), (0.0, 0.0));
    }
}
