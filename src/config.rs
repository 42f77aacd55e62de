// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time limits and tunable controller parameters.
//!
//! Limits that size buffers or bound the protocol are `const`s. Everything an operator might want
//! to retune on the bench lives in [`ControllerConfig`], whose `Default` is the tuned robot.

// Actuation
pub const WHEEL_COUNT: usize = 4;
pub const MAX_WHEEL_SPEED: i16 = 255;

// Serial link
pub const BAUD_RATE: u32 = 115_200;
pub const COMMAND_BUFFER_LEN: usize = 64;
pub const MAX_COMMAND_TOKENS: usize = 8;
pub const MAX_BYTES_PER_CYCLE: usize = 128; // Bounds time spent parsing in one cycle
pub const LINK_READY_TIMEOUT_MS: u32 = 2_000;

// Timing
pub const MIN_DT_S: f32 = 0.001; // Floor for a zero or implausibly small measured dt
pub const CYCLE_PERIOD_US: u32 = 5_000; // 200 Hz target

// Sensors
pub const IMU_INIT_ATTEMPTS: u8 = 3;
pub const LINE_FILTER_LEN: usize = 5;
pub const LINE_SENSOR_COUNT: usize = 3;
pub const STANDARD_GRAVITY: f32 = 9.806_65;

// Diagnostics
pub const TEST_MAX_DURATION_MS: u32 = 30_000;
pub const CALIBRATION_MAX_SECONDS: u8 = 30;

/// Gains and anti-windup bound for one PID loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Bound on the accumulated `∫error·dt`, applied before `ki`.
    pub integral_limit: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32, integral_limit: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit,
        }
    }
}

/// What it takes to leave the tripped state after a tip-over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RearmPolicy {
    /// Trip latches until the operator sends `REARM` with tilt back in range.
    Explicit,
    /// Trip clears on the first cycle with tilt back in range.
    Automatic,
}

/// Line-follow tuning. Positions are reported in `0..=position_max`, left to right.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineConfig {
    /// Full-scale raw reflectance reading (12-bit ADC).
    pub sensor_max: u16,
    pub position_max: u16,
    /// `max - min` of the adjusted channels below this means no line is visible.
    pub uniform_threshold: u16,
    /// `|error|` above this pivots in place instead of steering differentially.
    pub sharp_turn_threshold: f32,
    pub base_speed: i16,
    pub pivot_speed: i16,
}

impl LineConfig {
    #[inline]
    pub fn center(&self) -> f32 {
        self.position_max as f32 / 2.0
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            sensor_max: 4095,
            position_max: 1000,
            uniform_threshold: 400,
            sharp_turn_threshold: 350.0,
            base_speed: 120,
            pivot_speed: 110,
        }
    }
}

/// Tunables for the whole control core.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    pub balance: PidGains,
    pub heading: PidGains,
    pub line_pid: PidGains,
    pub line: LineConfig,

    /// Weight on the gyro-propagated tilt in the complementary filter.
    pub complementary_alpha: f32,
    /// Yaw rates below this (deg/s) are treated as drift and ignored.
    pub yaw_deadband_dps: f32,

    pub tip_over_deg: f32,
    pub rearm: RearmPolicy,

    pub telemetry_interval_ms: u32,
    /// Consecutive IMU read failures before IMU-dependent modes are dropped.
    pub imu_fault_limit: u8,
    /// Halt motor output entirely if the IMU cannot be brought up at boot.
    pub imu_required: bool,

    /// Motors mounted mirror-image, in FL/FR/RL/RR order.
    pub wheel_inverted: [bool; WHEEL_COUNT],
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            balance: PidGains::new(12.0, 0.8, 0.6, 25.0),
            heading: PidGains::new(2.5, 0.1, 0.15, 60.0),
            line_pid: PidGains::new(0.18, 0.0, 0.02, 200.0),
            line: LineConfig::default(),

            complementary_alpha: 0.98,
            yaw_deadband_dps: 0.5,

            tip_over_deg: 30.0,
            rearm: RearmPolicy::Explicit,

            telemetry_interval_ms: 200,
            imu_fault_limit: 10,
            imu_required: false,

            wheel_inverted: [false, true, false, true],
        }
    }
}
