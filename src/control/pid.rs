// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Generic PID controller for closed-loop control.
//!
//! Works in `no_std` and does not allocate memory.

use crate::config::PidGains;

/// PID controller with tunable gains, integral clamping and output clamping.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Accumulated `∫error·dt`, before `ki`
    integral: f32,
    /// Error from the previous update (for derivative term)
    last_error: f32,

    /// Output clamp
    out_min: f32,
    out_max: f32,

    /// Integral anti-windup clamp
    int_min: f32,
    int_max: f32,

    first_update: bool,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            last_error: 0.0,

            out_min: -1.0,
            out_max: 1.0,

            int_min: -1.0,
            int_max: 1.0,

            first_update: true,
        }
    }

    /// Create a controller from a gain set, with a symmetric integral clamp.
    pub fn from_gains(gains: PidGains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd)
            .with_integral_limits(-gains.integral_limit, gains.integral_limit)
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits for anti-windup.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.first_update = true;
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    #[inline]
    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    /// Update the controller.
    ///
    /// `setpoint`: desired value
    /// `measurement`: current value
    /// `dt`: timestep in seconds, must be positive
    ///
    /// Returns `kp·e + ki·clamp(∫e·dt) + kd·Δe/dt`, clamped to [`out_min`, `out_max`].
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        self.update_error(setpoint - measurement, dt)
    }

    /// Update the controller with a precomputed error (e.g. a wrapped angle difference).
    pub fn update_error(&mut self, error: f32, dt: f32) -> f32 {
        // ----- P term -----
        let p = self.kp * error;

        // ----- I term -----
        self.integral = (self.integral + error * dt).clamp(self.int_min, self.int_max);
        let i = self.ki * self.integral;

        // ----- D term (skipped on the first update after a reset to avoid a kick) -----
        let d = if self.first_update {
            self.first_update = false;
            0.0
        } else {
            self.kd * (error - self.last_error) / dt
        };
        self.last_error = error;

        // ----- Output clamp -----
        (p + i + d).clamp(self.out_min, self.out_max)
    }
}
