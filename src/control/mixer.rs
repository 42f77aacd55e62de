// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motion mixing: base command + corrections → four wheel speeds.
//!
//! Clamping is always the last step and per wheel. One saturated wheel never rescales the others.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{LineConfig, MAX_WHEEL_SPEED, WHEEL_COUNT};
use crate::control::{Corrections, LineDirection};
use crate::motors::{Wheel, WheelSpeeds};

/// Apply the balance (front/rear) and heading (left/right) corrections to a base command.
///
/// ```text
/// FL = base − balance + heading
/// FR = base − balance − heading
/// RL = base + balance + heading
/// RR = base + balance − heading
/// ```
pub fn mix(base: WheelSpeeds, corrections: &Corrections) -> WheelSpeeds {
    let mut raw = [0i32; WHEEL_COUNT];
    for wheel in Wheel::ALL {
        let front = matches!(wheel, Wheel::FrontLeft | Wheel::FrontRight);
        let balance = if front {
            -corrections.balance
        } else {
            corrections.balance
        };
        let heading = if wheel.is_left() {
            corrections.heading
        } else {
            -corrections.heading
        };
        raw[wheel.index()] = to_speed(base.get(wheel) as f32 + balance + heading);
    }
    WheelSpeeds::new(raw)
}

/// Wheel speeds while following a line.
///
/// Small errors steer differentially around the base speed. Past the sharp-turn threshold the robot
/// pivots in place toward the line instead.
pub fn line_mix(cfg: &LineConfig, direction: LineDirection, corrections: &Corrections) -> WheelSpeeds {
    let error = corrections.line_error;
    if error.abs() > cfg.sharp_turn_threshold {
        let turn = if error > 0.0 { 1 } else { -1 };
        let pivot = cfg.pivot_speed as i32;
        return WheelSpeeds::sides(-turn * pivot, turn * pivot);
    }

    let base = (cfg.base_speed as i32 * direction.sign()) as f32;
    WheelSpeeds::sides(
        to_speed(base - corrections.line),
        to_speed(base + corrections.line),
    )
}

/// Inverse mecanum kinematics.
///
/// `vx` forward, `vy` strafe left, `omega` rotate counter-clockwise. If any wheel would exceed MAX,
/// all four are scaled down together so the direction of travel is preserved.
pub fn mecanum(vx: i32, vy: i32, omega: i32) -> WheelSpeeds {
    // Widened so any operator-supplied intent sums and scales without overflow.
    let (vx, vy, omega) = (vx as i64, vy as i64, omega as i64);
    let raw = [
        vx - vy - omega,
        vx + vy + omega,
        vx + vy - omega,
        vx - vy + omega,
    ];

    let peak = raw.iter().map(|v| v.abs()).max().unwrap_or(0);
    let max = MAX_WHEEL_SPEED as i64;
    let mut scaled = [0i32; WHEEL_COUNT];
    for (s, v) in scaled.iter_mut().zip(raw) {
        let v = if peak > max { v * max / peak } else { v };
        *s = v as i32;
    }
    WheelSpeeds::new(scaled)
}

#[inline]
fn to_speed(v: f32) -> i32 {
    let max = MAX_WHEEL_SPEED as f32;
    v.clamp(-max, max).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corr(balance: f32, heading: f32) -> Corrections {
        Corrections {
            balance,
            heading,
            ..Default::default()
        }
    }

    #[test]
    fn zero_corrections_pass_base_through() {
        let base = WheelSpeeds::new([10, -20, 30, -40]);
        assert_eq!(mix(base, &Corrections::default()), base);
    }

    #[test]
    fn balance_and_heading_signs() {
        let out = mix(WheelSpeeds::new([100; 4]), &corr(10.0, 5.0));
        assert_eq!(out.as_array(), [95, 85, 115, 105]);
    }

    #[test]
    fn clamping_is_per_wheel() {
        let out = mix(WheelSpeeds::new([250; 4]), &corr(0.0, 20.0));
        // Left pair saturates, right pair keeps its exact value.
        assert_eq!(out.as_array(), [255, 230, 255, 230]);
    }

    #[test]
    fn line_mix_steers_toward_line() {
        let cfg = LineConfig::default();
        let c = Corrections {
            line: 20.0,
            line_error: 100.0,
            ..Default::default()
        };
        let out = line_mix(&cfg, LineDirection::Forward, &c);
        assert_eq!(out.as_array(), [100, 140, 100, 140]);

        let out = line_mix(&cfg, LineDirection::Backward, &c);
        assert_eq!(out.as_array(), [-140, -100, -140, -100]);
    }

    #[test]
    fn line_mix_pivots_past_threshold() {
        let cfg = LineConfig::default();
        let c = Corrections {
            line: 90.0,
            line_error: 400.0,
            ..Default::default()
        };
        let out = line_mix(&cfg, LineDirection::Forward, &c);
        assert_eq!(out.as_array(), [-110, 110, -110, 110]);

        let c = Corrections {
            line: -90.0,
            line_error: -400.0,
            ..Default::default()
        };
        let out = line_mix(&cfg, LineDirection::Forward, &c);
        assert_eq!(out.as_array(), [110, -110, 110, -110]);
    }

    #[test]
    fn mecanum_directions() {
        assert_eq!(mecanum(100, 0, 0).as_array(), [100; 4]);
        assert_eq!(mecanum(0, 100, 0).as_array(), [-100, 100, 100, -100]);
        assert_eq!(mecanum(0, 0, 50).as_array(), [-50, 50, -50, 50]);
    }

    #[test]
    fn mecanum_scales_proportionally() {
        let out = mecanum(200, 200, 0).as_array();
        assert_eq!(out, [0, 255, 255, 0]);

        let out = mecanum(255, 0, 255).as_array();
        assert_eq!(out, [0, 255, 0, 255]);
    }

    #[test]
    fn mecanum_saturates_extreme_intents() {
        assert_eq!(mecanum(10_000_000, 0, 0).as_array(), [255; 4]);
        assert_eq!(mecanum(-10_000_000, 0, 0).as_array(), [-255; 4]);

        let out = mecanum(i32::MAX, i32::MIN, i32::MAX).as_array();
        assert!(out.iter().all(|v| v.abs() <= 255));
        assert_eq!(out[3], 255);
    }
}
