// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Outbound status lines.
//!
//! Acknowledgements start with `OK`, refusals and faults with `ERR`, warnings with `WARN`, and
//! periodic telemetry with `TEL,`. Query replies (`GET_SENSORS`, `GET_IMU_CALIBRATION`) are bare
//! comma-separated values so scripts can parse them directly.

use core::fmt;

use crate::control::{Corrections, DriveMode, LineDirection};
use crate::error::DispatchError;
use crate::motors::{Wheel, WheelSpeeds};
use crate::safety::SafetyState;
use crate::sensors::{ImuCalibration, OrientationEstimate};

/// Immediate answer to an accepted command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    Move(WheelSpeeds),
    Drive(WheelSpeeds),
    Balance(bool),
    Heading(Option<f32>),
    LineFollow(LineDirection),
    Stop,
    TestStarted {
        wheel: Wheel,
        speed: i16,
        duration_ms: u32,
    },
    Rearmed,
    Verbose(bool),
    CalibrationStarted { seconds: u8 },
    Status(StatusSnapshot),
    Sensors([u16; 3]),
    Calibration(ImuCalibration),
}

/// Unsolicited line produced by the cycle itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    SafetyTrip { tilt_deg: f32 },
    SafetyCleared,
    TestDone { wheel: Wheel },
    CalibrationDone(ImuCalibration),
    CalibrationFailed,
    /// Too many consecutive IMU read failures; inertial modes were dropped.
    ImuDegraded,
    ImuRecovered,
    /// Emitted periodically while the IMU failed to initialize and motion is halted.
    Halted,
    Telemetry(Telemetry),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub mode: DriveMode,
    pub safety: SafetyState,
    pub imu_ok: bool,
    pub base: WheelSpeeds,
    pub orientation: OrientationEstimate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub orientation: OrientationEstimate,
    pub corrections: Corrections,
    /// `None` on a uniform surface.
    pub line_position: Option<f32>,
    pub position_m: (f32, f32),
    pub mode: DriveMode,
    pub safety: SafetyState,
}

/// `ERR <description>` line for a refused or malformed command.
pub struct ErrorLine<'a>(pub &'a DispatchError);

struct Speeds<'a>(&'a WheelSpeeds);

impl fmt::Display for Speeds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0.as_array();
        write!(f, "{a},{b},{c},{d}")
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

fn direction_label(direction: LineDirection) -> &'static str {
    match direction {
        LineDirection::Forward => "FORWARD",
        LineDirection::Backward => "BACKWARD",
    }
}

fn write_calibration(f: &mut fmt::Formatter<'_>, cal: &ImuCalibration) -> fmt::Result {
    let [gx, gy, gz] = cal.gyro_bias;
    let [ax, ay, az] = cal.accel_offset;
    write!(f, "{gx:.3},{gy:.3},{gz:.3},{ax:.4},{ay:.4},{az:.4}")
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Move(s) => write!(f, "OK MOVE {}", Speeds(s)),
            Reply::Drive(s) => write!(f, "OK DRIVE {}", Speeds(s)),
            Reply::Balance(on) => write!(f, "OK BALANCE {}", on_off(*on)),
            Reply::Heading(Some(t)) => write!(f, "OK HEADING {t:.1}"),
            Reply::Heading(None) => f.write_str("OK HEADING OFF"),
            Reply::LineFollow(d) => write!(f, "OK {}", direction_label(*d)),
            Reply::Stop => f.write_str("OK STOP"),
            Reply::TestStarted {
                wheel,
                speed,
                duration_ms,
            } => write!(
                f,
                "OK TEST {} speed {speed} for {duration_ms} ms",
                wheel.label()
            ),
            Reply::Rearmed => f.write_str("OK REARM"),
            Reply::Verbose(on) => write!(f, "OK VERBOSE {}", on_off(*on)),
            Reply::CalibrationStarted { seconds } => {
                write!(f, "OK CALIBRATE_IMU started, keep still for {seconds} s")
            }
            Reply::Status(s) => write!(
                f,
                "OK STATUS mode={} safety={} imu={} base={} tilt={:.2} yaw={:.2}",
                s.mode.label(),
                s.safety.label(),
                if s.imu_ok { "OK" } else { "UNAVAILABLE" },
                Speeds(&s.base),
                s.orientation.tilt_deg,
                s.orientation.yaw_deg,
            ),
            Reply::Sensors([l, c, r]) => write!(f, "{l},{c},{r}"),
            Reply::Calibration(cal) => write_calibration(f, cal),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::SafetyTrip { tilt_deg } => write!(
                f,
                "ERR SAFETY tilt {tilt_deg:.1} deg over limit, motors stopped"
            ),
            Event::SafetyCleared => f.write_str("OK SAFETY cleared"),
            Event::TestDone { wheel } => write!(f, "OK TEST done {}", wheel.label()),
            Event::CalibrationDone(cal) => {
                f.write_str("OK CALIBRATE_IMU done ")?;
                write_calibration(f, cal)
            }
            Event::CalibrationFailed => f.write_str("ERR CALIBRATE_IMU no samples collected"),
            Event::ImuDegraded => {
                f.write_str("WARN IMU read failures, balance and heading disabled")
            }
            Event::ImuRecovered => f.write_str("OK IMU readings resumed"),
            Event::Halted => f.write_str("ERR HALTED IMU initialization failed, motors disabled"),
            Event::Telemetry(t) => fmt::Display::fmt(t, f),
        }
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.corrections;
        write!(
            f,
            "TEL,{:.2},{:.2},{:.1},{:.1},{:.1},",
            self.orientation.tilt_deg, self.orientation.yaw_deg, c.balance, c.heading, c.line
        )?;
        match self.line_position {
            Some(p) => write!(f, "{p:.0},")?,
            None => f.write_str("-,")?,
        }
        write!(
            f,
            "{:.3},{:.3},{},{}",
            self.position_m.0,
            self.position_m.1,
            self.mode.label(),
            self.safety.label()
        )
    }
}

impl fmt::Display for ErrorLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERR {}", self.0)
    }
}

/// Write one status line followed by `\n`.
///
/// A failed write only loses the line; the cycle carries on.
pub fn send<W: fmt::Write, T: fmt::Display>(tx: &mut W, line: &T) {
    if writeln!(tx, "{line}").is_err() {
        log_warn!("status line dropped");
    }
}
