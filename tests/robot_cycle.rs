// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! End-to-end cycles: bytes in on a scripted serial link, wheel commands and status lines out.

use std::cell::Cell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::serial;

use mecabot::config::ControllerConfig;
use mecabot::control::{DriveMode, LineDirection};
use mecabot::error::SensorError;
use mecabot::motors::WheelMotor;
use mecabot::robot::{ImuHealth, Robot};
use mecabot::safety::SafetyState;
use mecabot::sensors::{Imu, ImuSample, LineSensor};

const CYCLE_US: u64 = 5_000;

// ----------------------------------------------------------------------
// Mocks
// ----------------------------------------------------------------------

#[derive(Default)]
struct ScriptedRx {
    bytes: VecDeque<u8>,
}

impl serial::Read<u8> for ScriptedRx {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.bytes.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

/// IMU whose next reading the test sets; `None` reads as a bus error.
struct SharedImu(Rc<Cell<Option<ImuSample>>>);

impl Imu for SharedImu {
    fn read(&mut self) -> Result<ImuSample, SensorError> {
        self.0.get().ok_or(SensorError::Bus)
    }
}

struct SharedLine(Rc<Cell<[u16; 3]>>);

impl LineSensor for SharedLine {
    fn read(&mut self) -> [u16; 3] {
        self.0.get()
    }
}

/// Records the raw (post-inversion) speed written to the channel.
struct Channel(Rc<Cell<i16>>);

impl WheelMotor for Channel {
    fn set_speed(&mut self, speed: i16) {
        self.0.set(speed);
    }
}

// ----------------------------------------------------------------------
// Bench
// ----------------------------------------------------------------------

struct Bench {
    robot: Robot<SharedImu, SharedLine, Channel, Channel, Channel, Channel>,
    imu: Rc<Cell<Option<ImuSample>>>,
    line: Rc<Cell<[u16; 3]>>,
    channels: [Rc<Cell<i16>>; 4],
    rx: ScriptedRx,
    tx: String,
    now_us: u64,
}

fn level() -> ImuSample {
    ImuSample {
        accel: [0.0, 0.0, 1.0],
        gyro: [0.0; 3],
    }
}

fn tilted(deg: f32) -> ImuSample {
    let r = deg.to_radians();
    ImuSample {
        accel: [r.sin(), 0.0, r.cos()],
        gyro: [0.0; 3],
    }
}

impl Bench {
    fn new(health: ImuHealth) -> Self {
        let imu = Rc::new(Cell::new(Some(level())));
        let line = Rc::new(Cell::new([3000; 3]));
        let channels: [Rc<Cell<i16>>; 4] = Default::default();
        let robot = Robot::new(
            ControllerConfig::default(),
            SharedImu(imu.clone()),
            health,
            SharedLine(line.clone()),
            Channel(channels[0].clone()),
            Channel(channels[1].clone()),
            Channel(channels[2].clone()),
            Channel(channels[3].clone()),
        );
        Self {
            robot,
            imu,
            line,
            channels,
            rx: ScriptedRx::default(),
            tx: String::new(),
            now_us: 0,
        }
    }

    fn send(&mut self, line: &str) {
        self.rx.bytes.extend(line.bytes());
    }

    fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.now_us += CYCLE_US;
            self.robot.cycle(self.now_us, &mut self.rx, &mut self.tx);
        }
    }

    /// Status lines written since the last call.
    fn take_output(&mut self) -> String {
        std::mem::take(&mut self.tx)
    }

    /// Logical wheel speeds (before mounting inversion).
    fn wheels(&self) -> [i16; 4] {
        self.robot.drive().last().as_array()
    }

    fn raw_channels(&self) -> [i16; 4] {
        [
            self.channels[0].get(),
            self.channels[1].get(),
            self.channels[2].get(),
            self.channels[3].get(),
        ]
    }
}

// ----------------------------------------------------------------------
// Protocol
// ----------------------------------------------------------------------

#[test]
fn bare_move_line_sets_base_speeds() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("100,100,100,100\n");
    b.run(1);

    assert_eq!(b.robot.state().base().as_array(), [100; 4]);
    assert_eq!(b.wheels(), [100; 4]);
    assert!(b.take_output().contains("OK MOVE 100,100,100,100"));

    // Right-side motors are mounted mirror-image by default.
    assert_eq!(b.raw_channels(), [100, -100, 100, -100]);
}

#[test]
fn malformed_line_keeps_previous_speeds() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("50,50,50,50\n");
    b.run(1);
    b.take_output();

    b.send("abc,1,2,3\n");
    b.run(1);

    assert_eq!(b.wheels(), [50; 4]);
    assert_eq!(
        b.take_output().trim_end(),
        "ERR argument 1 is not a valid number"
    );
}

#[test]
fn out_of_range_speeds_are_clamped() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("MOVE,300,-300,10,0\r\n");
    b.run(1);
    assert_eq!(b.wheels(), [255, -255, 10, 0]);
}

#[test]
fn command_split_across_cycles_is_reassembled() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("10,20,");
    b.run(1);
    assert_eq!(b.wheels(), [0; 4]);
    assert!(b.take_output().is_empty());

    b.send("30,40\n");
    b.run(1);
    assert_eq!(b.wheels(), [10, 20, 30, 40]);
}

#[test]
fn byte_budget_bounds_each_cycle() {
    let mut b = Bench::new(ImuHealth::Available);
    for _ in 0..30 {
        b.send("STOP\n");
    }
    b.run(1);

    // 128 bytes: 25 complete lines plus three bytes of the 26th.
    assert_eq!(b.rx.bytes.len(), 150 - 128);
    assert_eq!(b.take_output().matches("OK STOP").count(), 25);

    b.run(1);
    assert!(b.rx.bytes.is_empty());
    assert_eq!(b.take_output().matches("OK STOP").count(), 5);
}

#[test]
fn overlong_line_is_reported_once_and_parsing_resumes() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send(&"x".repeat(80));
    b.send("\n20,20,20,20\n");
    b.run(1);

    let out = b.take_output();
    assert_eq!(out.matches("ERR line exceeds buffer, discarded").count(), 1);
    assert!(out.contains("OK MOVE 20,20,20,20"));
    assert_eq!(b.wheels(), [20; 4]);
}

#[test]
fn drive_command_scales_mecanum_mix() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("DRIVE,200,100,0\n");
    b.run(1);
    assert_eq!(b.wheels(), [85, 255, 255, 85]);
}

#[test]
fn extreme_drive_intent_saturates() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("DRIVE,10000000,0,0\n");
    b.run(1);
    assert_eq!(b.wheels(), [255; 4]);
}

#[test]
fn stop_is_idempotent() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("FORWARD\n");
    b.run(1);
    assert_ne!(b.wheels(), [0; 4]);

    b.send("STOP\nS\n");
    b.run(1);

    assert_eq!(b.take_output().matches("OK STOP").count(), 2);
    assert_eq!(b.wheels(), [0; 4]);
    assert_eq!(b.robot.state().mode(), DriveMode::Manual);
}

#[test]
fn queries_answer_with_bare_values() {
    let mut b = Bench::new(ImuHealth::Available);
    b.run(1);
    b.send("GET_SENSORS\nSTATUS\n");
    b.run(1);

    let out = b.take_output();
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("3000,3000,3000"));
    let status = lines.next().unwrap_or_default();
    assert!(
        status.starts_with("OK STATUS mode=MANUAL safety=NORMAL imu=OK base=0,0,0,0 tilt="),
        "{status}"
    );
}

// ----------------------------------------------------------------------
// Control
// ----------------------------------------------------------------------

#[test]
fn balance_correction_opposes_tilt_and_decays_when_level() {
    let mut b = Bench::new(ImuHealth::Available);
    b.imu.set(Some(tilted(10.0)));
    b.send("BALANCE,ON\n");
    b.run(1);

    let [fl, fr, rl, rr] = b.wheels();
    assert!(b.robot.state().corrections().balance < 0.0);
    assert!(fl > 100);
    assert_eq!((fl, rl), (fr, rr));
    assert_eq!(fl, -rl);

    b.imu.set(Some(level()));
    b.run(300);
    let [fl, _, rl, _] = b.wheels();
    assert!(fl.abs() < 10 && rl.abs() < 10, "{fl} {rl}");
    assert_eq!(b.robot.state().mode(), DriveMode::Balance);
}

#[test]
fn yaw_wraps_past_180() {
    let mut b = Bench::new(ImuHealth::Available);
    b.imu.set(Some(ImuSample {
        accel: [0.0, 0.0, 1.0],
        gyro: [0.0, 0.0, 100.0],
    }));
    // First cycle uses the 1 ms floor: 0.1 + 399 * 0.5 = 199.6 deg.
    b.run(400);

    let yaw = b.robot.state().orientation().yaw_deg;
    assert!(yaw > -180.0 && yaw <= 180.0);
    assert!((yaw + 160.4).abs() < 0.5, "yaw {yaw}");
}

#[test]
fn heading_target_is_wrapped() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("HEADING,350\n");
    b.run(1);

    assert!(b.take_output().contains("OK HEADING -10.0"));
    assert_eq!(
        b.robot.state().mode(),
        DriveMode::HeadingHold { target_deg: -10.0 }
    );
}

#[test]
fn uniform_surface_drives_straight_at_center() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("FORWARD\n");
    b.run(3);

    let line = b.robot.state().line();
    assert!(line.uniform);
    assert_eq!(line.position, 500.0);
    assert_eq!(b.robot.state().corrections().line, 0.0);
    assert_eq!(b.wheels(), [120; 4]);

    b.send("B\n");
    b.run(1);
    assert_eq!(
        b.robot.state().mode(),
        DriveMode::LineFollow {
            direction: LineDirection::Backward
        }
    );
    assert_eq!(b.wheels(), [-120; 4]);
}

#[test]
fn visible_line_steers_differentially() {
    let mut b = Bench::new(ImuHealth::Available);
    // Bright surface, one channel over a dark line.
    b.line.set([4000, 4000, 100]);
    b.send("FORWARD\n");
    b.run(1);

    let line = b.robot.state().line();
    assert!(!line.uniform);
    let [fl, fr, rl, rr] = b.wheels();
    assert_eq!((fl, fr), (rl, rr));
    assert_ne!(fl, fr);
}

#[test]
fn motor_test_runs_once_then_stops() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("MOVE,60,60,60,60\nTEST,3,150,100\n");
    b.run(1);

    assert_eq!(b.wheels(), [0, 0, 0, 150]);
    assert!(b.robot.state().motor_test_active());
    assert!(b.take_output().contains("OK TEST RR speed 150 for 100 ms"));

    b.run(25);
    assert_eq!(b.wheels(), [0; 4]);
    assert!(!b.robot.state().motor_test_active());
    assert_eq!(b.take_output().matches("OK TEST done RR").count(), 1);

    b.run(10);
    assert!(b.take_output().is_empty());
}

// ----------------------------------------------------------------------
// Safety
// ----------------------------------------------------------------------

#[test]
fn tip_over_stops_motors_and_latches_until_rearm() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("MOVE,120,120,120,120\n");
    b.run(1);
    assert_eq!(b.wheels(), [120; 4]);

    // Filtered tilt crosses 30 deg after ~55 cycles at a 45 deg accelerometer reading.
    b.imu.set(Some(tilted(45.0)));
    b.run(100);

    let state = b.robot.state();
    assert!(state.is_tripped());
    assert_eq!(state.safety(), SafetyState::Tripped);
    assert_eq!(state.mode(), DriveMode::Manual);
    assert_eq!(state.base().as_array(), [0; 4]);
    assert_eq!(b.wheels(), [0; 4]);
    assert_eq!(b.raw_channels(), [0; 4]);
    assert_eq!(b.take_output().matches("ERR SAFETY tilt").count(), 1);

    b.send("MOVE,50,50,50,50\n");
    b.run(1);
    assert!(b
        .take_output()
        .contains("ERR safety trip active, send REARM"));
    assert_eq!(b.wheels(), [0; 4]);

    b.send("REARM\n");
    b.run(1);
    assert!(b.take_output().contains("ERR tilt still above limit"));

    b.imu.set(Some(level()));
    b.run(300);
    assert!(b.robot.is_tripped());

    b.send("REARM\n");
    b.run(1);
    assert!(b.take_output().contains("OK REARM"));
    assert!(!b.robot.is_tripped());
    // The pre-trip command is not resumed.
    assert_eq!(b.wheels(), [0; 4]);

    b.send("MOVE,50,50,50,50\n");
    b.run(1);
    assert_eq!(b.wheels(), [50; 4]);
}

// ----------------------------------------------------------------------
// IMU health
// ----------------------------------------------------------------------

#[test]
fn halted_robot_refuses_commands_and_keeps_reporting() {
    let mut b = Bench::new(ImuHealth::Halted);
    b.send("100,100,100,100\n");
    b.run(100);

    let out = b.take_output();
    assert!(out.contains("ERR system halted: IMU initialization failed"));
    assert_eq!(out.matches("ERR HALTED").count(), 2);
    assert_eq!(b.wheels(), [0; 4]);
    assert!(b.robot.is_halted());
}

#[test]
fn absent_imu_disables_inertial_modes_only() {
    let mut b = Bench::new(ImuHealth::Absent);
    b.send("BALANCE,ON\nHEADING,90\n40,40,40,40\n");
    b.run(1);

    let out = b.take_output();
    assert_eq!(out.matches("ERR IMU unavailable").count(), 2);
    assert!(out.contains("OK MOVE 40,40,40,40"));
    assert_eq!(b.wheels(), [40; 4]);
}

#[test]
fn repeated_read_failures_drop_balance_then_recover() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("BALANCE,ON\n");
    b.run(1);
    b.take_output();

    b.imu.set(None);
    b.run(9);
    assert_eq!(b.robot.state().mode(), DriveMode::Balance);
    b.run(1);
    assert_eq!(b.robot.state().mode(), DriveMode::Manual);
    assert!(b
        .take_output()
        .contains("WARN IMU read failures, balance and heading disabled"));

    b.send("BALANCE,ON\n");
    b.run(1);
    assert!(b.take_output().contains("ERR IMU unavailable"));

    b.imu.set(Some(level()));
    b.run(1);
    assert!(b.take_output().contains("OK IMU readings resumed"));
}

#[test]
fn calibration_averages_samples_and_rezeroes_yaw() {
    let mut b = Bench::new(ImuHealth::Available);
    b.imu.set(Some(ImuSample {
        accel: [0.0, 0.0, 1.0],
        gyro: [0.5, 0.0, 2.0],
    }));
    b.send("CALIBRATE_IMU,1\n");
    b.run(10);
    assert!(b.robot.state().calibrating());

    b.send("MOVE,50,50,50,50\n");
    b.run(1);
    let out = b.take_output();
    assert!(out.contains("OK CALIBRATE_IMU started"));
    assert!(out.contains("ERR busy calibrating IMU"));
    assert_eq!(b.wheels(), [0; 4]);

    b.run(200);
    assert!(!b.robot.state().calibrating());
    assert!(b
        .take_output()
        .contains("OK CALIBRATE_IMU done 0.500,0.000,2.000,0.0000,0.0000,0.0000"));

    b.run(5);
    assert_eq!(b.robot.state().orientation().yaw_deg, 0.0);

    b.send("GET_IMU_CALIBRATION\n");
    b.run(1);
    assert_eq!(
        b.take_output().trim_end(),
        "0.500,0.000,2.000,0.0000,0.0000,0.0000"
    );
}

#[test]
fn verbose_telemetry_follows_its_own_interval() {
    let mut b = Bench::new(ImuHealth::Available);
    b.send("VERBOSE,ON\n");
    b.run(200);

    let out = b.take_output();
    let tel: Vec<&str> = out.lines().filter(|l| l.starts_with("TEL,")).collect();
    assert_eq!(tel.len(), 5);
    assert!(tel[0].ends_with(",-,0.000,0.000,MANUAL,NORMAL"), "{}", tel[0]);
}
