// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The controller aggregate: every piece of mutable robot state, and the two ways it changes.
//!
//! - [`ControllerState::handle`] applies one validated operator command.
//! - [`ControllerState::step`] runs one control cycle on a fresh sensor frame and returns the wheel
//!   output plus any unsolicited status lines.
//!
//! Neither touches hardware, so the whole control core runs unchanged under test.

use heapless::Vec;

use crate::config::{ControllerConfig, RearmPolicy, MIN_DT_S};
use crate::control::mixer::{line_mix, mecanum, mix};
use crate::control::{ControlLoops, Corrections, DriveMode};
use crate::error::Rejected;
use crate::motors::{Wheel, WheelSpeeds};
use crate::protocol::{Command, Event, Reply, StatusSnapshot, Telemetry};
use crate::safety::{SafetyState, SafetySupervisor, SensorTransition, Verdict};
use crate::sensors::imu::{wrap_degrees, Calibrator};
use crate::sensors::{
    DeadReckoning, ImuSample, LinePosition, LineTracker, OrientationEstimate, OrientationFilter,
};

/// Upper bound on unsolicited lines produced by one cycle.
pub const MAX_EVENTS_PER_CYCLE: usize = 8;

/// IMU availability decided at boot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImuHealth {
    Available,
    /// Init failed and the IMU is optional: run without balance or heading hold.
    Absent,
    /// Init failed and the IMU is required: motors stay disabled.
    Halted,
}

/// Raw sensor input for one cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SensorFrame {
    /// `None` when the IMU is absent or the read failed.
    pub imu: Option<ImuSample>,
    pub line: [u16; 3],
}

pub struct CycleOutput {
    pub wheels: WheelSpeeds,
    pub events: Vec<Event, MAX_EVENTS_PER_CYCLE>,
}

#[derive(Copy, Clone, Debug)]
struct MotorTest {
    wheel: Wheel,
    speed: i16,
    until_us: u64,
}

pub struct ControllerState {
    cfg: ControllerConfig,
    mode: DriveMode,
    base: WheelSpeeds,

    filter: OrientationFilter,
    line: LineTracker,
    loops: ControlLoops,
    safety: SafetySupervisor,
    odometry: DeadReckoning,

    imu: ImuHealth,

    motor_test: Option<MotorTest>,
    calibration: Option<Calibrator>,

    verbose: bool,
    corrections: Corrections,
    last_report_us: u64,
}

impl ControllerState {
    /// Boot state: motors stopped, every mode disabled.
    pub fn new(cfg: ControllerConfig, imu: ImuHealth) -> Self {
        Self {
            mode: DriveMode::Manual,
            base: WheelSpeeds::ZERO,

            filter: OrientationFilter::new(cfg.complementary_alpha, cfg.yaw_deadband_dps),
            line: LineTracker::new(cfg.line),
            loops: ControlLoops::new(&cfg),
            safety: SafetySupervisor::new(cfg.tip_over_deg, cfg.rearm, cfg.imu_fault_limit),
            odometry: DeadReckoning::new(),

            imu,

            motor_test: None,
            calibration: None,

            verbose: false,
            corrections: Corrections::default(),
            last_report_us: 0,
            cfg,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Base wheel speeds before any correction.
    #[inline]
    pub fn base(&self) -> WheelSpeeds {
        self.base
    }

    #[inline]
    pub fn orientation(&self) -> OrientationEstimate {
        self.filter.estimate()
    }

    #[inline]
    pub fn line(&self) -> LinePosition {
        self.line.last()
    }

    #[inline]
    pub fn corrections(&self) -> Corrections {
        self.corrections
    }

    #[inline]
    pub fn safety(&self) -> SafetyState {
        self.safety.state()
    }

    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.safety.is_tripped()
    }

    #[inline]
    pub fn imu_health(&self) -> ImuHealth {
        self.imu
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.imu == ImuHealth::Halted
    }

    #[inline]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    #[inline]
    pub fn motor_test_active(&self) -> bool {
        self.motor_test.is_some()
    }

    #[inline]
    pub fn calibrating(&self) -> bool {
        self.calibration.is_some()
    }

    #[inline]
    pub fn position(&self) -> (f32, f32) {
        self.odometry.position()
    }

    /// IMU present and not faulted.
    fn imu_usable(&self) -> bool {
        self.imu == ImuHealth::Available && !self.safety.sensor_fault()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply one operator command. Refusals leave the state untouched.
    pub fn handle(&mut self, cmd: Command, now_us: u64) -> Result<Reply, Rejected> {
        if self.is_halted() {
            return Err(Rejected::Halted);
        }
        let moves = matches!(
            cmd,
            Command::Move(_)
                | Command::Drive { .. }
                | Command::Balance(_)
                | Command::Heading(_)
                | Command::HeadingOff
                | Command::LineFollow(_)
                | Command::Test { .. }
                | Command::CalibrateImu { .. }
        );
        if moves && self.calibrating() {
            return Err(Rejected::Calibrating);
        }
        if moves && self.is_tripped() && self.safety.policy() == RearmPolicy::Explicit {
            return Err(Rejected::Tripped);
        }

        match cmd {
            Command::Move(speeds) => {
                self.set_base(speeds);
                Ok(Reply::Move(speeds))
            }
            Command::Drive { vx, vy, omega } => {
                let speeds = mecanum(vx, vy, omega);
                self.set_base(speeds);
                Ok(Reply::Drive(speeds))
            }
            Command::Balance(on) => {
                if on && !self.imu_usable() {
                    return Err(Rejected::ImuUnavailable);
                }
                if on || self.mode.balancing() {
                    self.motor_test = None;
                    self.mode = self.mode.with_balance(on);
                }
                Ok(Reply::Balance(on))
            }
            Command::Heading(target) => {
                if !self.imu_usable() {
                    return Err(Rejected::ImuUnavailable);
                }
                let target = wrap_degrees(target);
                self.motor_test = None;
                self.mode = self.mode.with_heading(Some(target));
                // Re-sending the current target still starts the loop afresh.
                self.loops.reset_heading();
                Ok(Reply::Heading(Some(target)))
            }
            Command::HeadingOff => {
                if self.mode.heading_target().is_some() {
                    self.motor_test = None;
                    self.mode = self.mode.with_heading(None);
                }
                Ok(Reply::Heading(None))
            }
            Command::LineFollow(direction) => {
                self.motor_test = None;
                self.mode = DriveMode::LineFollow { direction };
                Ok(Reply::LineFollow(direction))
            }
            Command::Stop => {
                self.stop_all();
                Ok(Reply::Stop)
            }
            Command::Test {
                wheel,
                speed,
                duration_ms,
            } => {
                self.stop_all();
                self.motor_test = Some(MotorTest {
                    wheel,
                    speed,
                    until_us: now_us + duration_ms as u64 * 1_000,
                });
                log_info!("motor test {} speed {} for {} ms", wheel.label(), speed, duration_ms);
                Ok(Reply::TestStarted {
                    wheel,
                    speed,
                    duration_ms,
                })
            }
            Command::Rearm => {
                self.safety.rearm(self.filter.estimate().tilt_deg)?;
                Ok(Reply::Rearmed)
            }
            Command::Verbose(on) => {
                self.verbose = on;
                Ok(Reply::Verbose(on))
            }
            Command::Status => Ok(Reply::Status(StatusSnapshot {
                mode: self.mode,
                safety: self.safety.state(),
                imu_ok: self.imu_usable(),
                base: self.base,
                orientation: self.filter.estimate(),
            })),
            Command::GetSensors => Ok(Reply::Sensors(self.line.last().smoothed)),
            Command::CalibrateImu { seconds } => {
                if !self.imu_usable() {
                    return Err(Rejected::ImuUnavailable);
                }
                self.stop_all();
                self.calibration = Some(Calibrator::new(now_us, seconds));
                log_info!("IMU calibration started for {} s", seconds);
                Ok(Reply::CalibrationStarted { seconds })
            }
            Command::GetImuCalibration => Ok(Reply::Calibration(self.filter.calibration())),
        }
    }

    fn set_base(&mut self, speeds: WheelSpeeds) {
        self.motor_test = None;
        if self.mode.line_direction().is_some() {
            self.mode = DriveMode::Manual;
        }
        self.base = speeds;
    }

    /// Zero the base command, drop every mode and cancel any diagnostic in progress.
    fn stop_all(&mut self) {
        self.base = WheelSpeeds::ZERO;
        self.mode = DriveMode::Manual;
        self.motor_test = None;
        self.calibration = None;
    }

    // ------------------------------------------------------------------
    // Cycle
    // ------------------------------------------------------------------

    /// Run one control cycle.
    ///
    /// `dt` is the time since the previous cycle in seconds; values below the floor (including zero
    /// and NaN) are replaced by it.
    pub fn step(&mut self, frame: &SensorFrame, dt: f32, now_us: u64) -> CycleOutput {
        let dt = if dt >= MIN_DT_S { dt } else { MIN_DT_S };
        let mut out = CycleOutput {
            wheels: WheelSpeeds::ZERO,
            events: Vec::new(),
        };

        if self.is_halted() {
            if self.report_due(now_us) {
                emit(&mut out.events, Event::Halted);
            }
            return out;
        }

        // ----- Inertial estimate -----
        let accel = self.update_imu(frame.imu, dt, &mut out.events);
        let orientation = self.filter.estimate();

        // ----- Line position -----
        let line = self.line.update(frame.line);

        // ----- Calibration window -----
        if let Some(cal) = &self.calibration {
            if cal.is_done(now_us) {
                match cal.finish() {
                    Some(result) => {
                        log_info!("IMU calibration done over {} samples", cal.samples());
                        self.filter.set_calibration(result);
                        self.filter.reset();
                        emit(&mut out.events, Event::CalibrationDone(result));
                    }
                    None => emit(&mut out.events, Event::CalibrationFailed),
                }
                self.calibration = None;
            }
        }

        // ----- Safety -----
        let verdict = self.safety.evaluate(orientation.tilt_deg);
        match verdict {
            Verdict::Trip => {
                self.on_trip();
                emit(
                    &mut out.events,
                    Event::SafetyTrip {
                        tilt_deg: orientation.tilt_deg,
                    },
                );
            }
            Verdict::Recovered => emit(&mut out.events, Event::SafetyCleared),
            Verdict::Clear | Verdict::Holding => {}
        }

        // ----- Loops + mixer -----
        if verdict.blocks_motion() {
            self.corrections = Corrections::default();
        } else if let Some(test) = self.motor_test {
            self.corrections = Corrections::default();
            if now_us >= test.until_us {
                log_info!("motor test {} done", test.wheel.label());
                self.motor_test = None;
                emit(&mut out.events, Event::TestDone { wheel: test.wheel });
            } else {
                out.wheels = WheelSpeeds::single(test.wheel, test.speed);
            }
        } else if self.calibrating() {
            self.corrections = Corrections::default();
        } else {
            self.corrections = self.loops.update(&self.mode, orientation, &line, dt);
            out.wheels = match self.mode {
                DriveMode::LineFollow { direction } => {
                    line_mix(&self.cfg.line, direction, &self.corrections)
                }
                _ => mix(self.base, &self.corrections),
            };
        }

        // ----- Dead reckoning -----
        if let Some(accel) = accel {
            let yaw = self.filter.estimate().yaw_deg;
            self.odometry.update(accel, yaw, dt, !out.wheels.is_zero());
        }

        // ----- Telemetry -----
        if self.verbose && self.report_due(now_us) {
            let telemetry = Telemetry {
                orientation: self.filter.estimate(),
                corrections: self.corrections,
                line_position: line.valid_position(),
                position_m: self.odometry.position(),
                mode: self.mode,
                safety: self.safety.state(),
            };
            emit(&mut out.events, Event::Telemetry(telemetry));
        }

        out
    }

    /// Fold this cycle's IMU sample in, tracking read failures. Returns calibrated acceleration.
    fn update_imu(
        &mut self,
        sample: Option<ImuSample>,
        dt: f32,
        events: &mut Vec<Event, MAX_EVENTS_PER_CYCLE>,
    ) -> Option<[f32; 3]> {
        if self.imu != ImuHealth::Available {
            return None;
        }

        match self.safety.report_imu_read(sample.is_some()) {
            SensorTransition::Faulted => {
                if self.mode.needs_imu() {
                    self.mode = self.mode.with_balance(false).with_heading(None);
                }
                self.calibration = None;
                emit(events, Event::ImuDegraded);
            }
            SensorTransition::Recovered => emit(events, Event::ImuRecovered),
            SensorTransition::Unchanged => {}
        }
        let sample = sample?;

        if let Some(cal) = self.calibration.as_mut() {
            cal.push(&sample);
        }
        self.filter.update(&sample, dt);
        Some(self.filter.calibration().apply(&sample).accel)
    }

    fn on_trip(&mut self) {
        self.mode = DriveMode::Manual;
        self.loops.reset();
        self.motor_test = None;
        self.calibration = None;
        // A latched trip must not resume the old command once re-armed.
        if self.safety.policy() == RearmPolicy::Explicit {
            self.base = WheelSpeeds::ZERO;
        }
    }

    fn report_due(&mut self, now_us: u64) -> bool {
        let interval_us = self.cfg.telemetry_interval_ms as u64 * 1_000;
        if now_us.saturating_sub(self.last_report_us) >= interval_us {
            self.last_report_us = now_us;
            true
        } else {
            false
        }
    }
}

fn emit(events: &mut Vec<Event, MAX_EVENTS_PER_CYCLE>, event: Event) {
    if events.push(event).is_err() {
        log_warn!("event queue full, status line dropped");
    }
}
