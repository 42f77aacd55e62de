// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The balance, heading and line-tracking PID loops.
//!
//! Each loop is active only in the modes that use it. A loop that is inactive contributes zero and
//! has its integrator and derivative history cleared, so re-enabling never starts from stale state.
//! A discontinuous setpoint change (new heading target, line direction reversal) resets too.

use crate::config::{ControllerConfig, MAX_WHEEL_SPEED};
use crate::control::{DriveMode, LineDirection, Pid};
use crate::sensors::imu::wrap_degrees;
use crate::sensors::{LinePosition, OrientationEstimate};

/// Correction terms produced by one evaluation of the loop bank.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Corrections {
    /// Front/rear differential.
    pub balance: f32,
    /// Left/right differential from heading hold.
    pub heading: f32,
    /// Left/right differential from line tracking.
    pub line: f32,
    /// `center - position` used by the line loop; zero when the loop is inactive.
    pub line_error: f32,
}

pub struct ControlLoops {
    balance: Pid,
    heading: Pid,
    line: Pid,
    line_center: f32,

    balance_active: bool,
    heading_target: Option<f32>,
    line_direction: Option<LineDirection>,
}

impl ControlLoops {
    pub fn new(cfg: &ControllerConfig) -> Self {
        let limit = MAX_WHEEL_SPEED as f32;
        Self {
            balance: Pid::from_gains(cfg.balance).with_output_limits(-limit, limit),
            heading: Pid::from_gains(cfg.heading).with_output_limits(-limit, limit),
            line: Pid::from_gains(cfg.line_pid).with_output_limits(-limit, limit),
            line_center: cfg.line.center(),

            balance_active: false,
            heading_target: None,
            line_direction: None,
        }
    }

    /// Clear every loop, e.g. after a safety trip.
    pub fn reset(&mut self) {
        self.balance.reset();
        self.heading.reset();
        self.line.reset();
        self.balance_active = false;
        self.heading_target = None;
        self.line_direction = None;
    }

    /// Clear the heading integrator and derivative history without changing the tracked target.
    pub fn reset_heading(&mut self) {
        self.heading.reset();
    }

    /// Evaluate every loop the mode enables.
    pub fn update(
        &mut self,
        mode: &DriveMode,
        orientation: OrientationEstimate,
        line: &LinePosition,
        dt: f32,
    ) -> Corrections {
        let mut out = Corrections::default();

        // ----- Balance -----
        let balancing = mode.balancing();
        if balancing != self.balance_active {
            self.balance.reset();
            self.balance_active = balancing;
        }
        if balancing {
            out.balance = self.balance.update(0.0, orientation.tilt_deg, dt);
        }

        // ----- Heading -----
        let target = mode.heading_target();
        if target != self.heading_target {
            self.heading.reset();
            self.heading_target = target;
        }
        if let Some(target) = target {
            let error = wrap_degrees(target - orientation.yaw_deg);
            out.heading = self.heading.update_error(error, dt);
        }

        // ----- Line tracking -----
        let direction = mode.line_direction().filter(|_| !line.uniform);
        if direction != self.line_direction {
            self.line.reset();
            self.line_direction = direction;
        }
        if direction.is_some() {
            let error = self.line_center - line.position;
            out.line = self.line.update_error(error, dt);
            out.line_error = error;
        }

        out
    }
}
