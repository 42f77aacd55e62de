// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Robot
//!
//! The main cycle scheduler and the controller state it owns.
//!
//! Each call to [`Robot::cycle`] performs, in order:
//!
//! 1. Compute `dt` since the previous cycle (floored).
//! 2. Drain up to [`MAX_BYTES_PER_CYCLE`] bytes from the serial link, dispatching complete lines
//!    and answering each with an `OK` / `ERR` status line.
//! 3. Read the IMU and the reflectance array.
//! 4. [`ControllerState::step`]: filters, safety supervisor, loops, mixer.
//! 5. Write all four wheel channels.
//! 6. Emit unsolicited status lines (trip, test done, telemetry, ...).
//!
//! Typical usage pattern:
//!
//! ```ignore
//! loop {
//!     robot.cycle(clock.now_us(), &mut rx, &mut tx);
//!     clock.wait_until(next_cycle);
//! }
//! ```

pub mod boot;
pub mod state;

use core::fmt;

use embedded_hal::serial;

use crate::config::{ControllerConfig, MAX_BYTES_PER_CYCLE, MIN_DT_S};
use crate::error::{CommandError, DispatchError};
use crate::motors::{MecanumDrive, WheelMotor};
use crate::protocol::status::send;
use crate::protocol::{Command, ErrorLine, Parser};
use crate::sensors::{Imu, LineSensor};

pub use boot::LinkStatus;
pub use state::{ControllerState, CycleOutput, ImuHealth, SensorFrame};

pub struct Robot<I, L, FL, FR, RL, RR> {
    imu: I,
    line: L,
    drive: MecanumDrive<FL, FR, RL, RR>,
    parser: Parser,
    state: ControllerState,
    last_cycle_us: Option<u64>,
}

impl<I, L, FL, FR, RL, RR> Robot<I, L, FL, FR, RL, RR>
where
    I: Imu,
    L: LineSensor,
    FL: WheelMotor,
    FR: WheelMotor,
    RL: WheelMotor,
    RR: WheelMotor,
{
    /// Assemble the robot with motors stopped and every mode disabled.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: ControllerConfig,
        imu: I,
        imu_health: ImuHealth,
        line: L,
        fl: FL,
        fr: FR,
        rl: RL,
        rr: RR,
    ) -> Self {
        Self {
            imu,
            line,
            drive: MecanumDrive::new(fl, fr, rl, rr, cfg.wheel_inverted),
            parser: Parser::new(),
            state: ControllerState::new(cfg, imu_health),
            last_cycle_us: None,
        }
    }

    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[inline]
    pub fn drive(&self) -> &MecanumDrive<FL, FR, RL, RR> {
        &self.drive
    }

    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.state.is_tripped()
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    /// Run one full cycle at time `now_us` (monotonic microseconds).
    pub fn cycle<R, W>(&mut self, now_us: u64, rx: &mut R, tx: &mut W)
    where
        R: serial::Read<u8>,
        W: fmt::Write,
    {
        let dt = self.elapsed(now_us);

        // ----- Commands -----
        for _ in 0..MAX_BYTES_PER_CYCLE {
            match rx.read() {
                Ok(byte) => {
                    if let Some(parsed) = self.parser.push(byte) {
                        self.dispatch(parsed, now_us, tx);
                    }
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    log_warn!("serial receive error");
                    break;
                }
            }
        }

        // ----- Sensors -----
        let imu = if self.state.imu_health() == ImuHealth::Available {
            match self.imu.read() {
                Ok(sample) => Some(sample),
                Err(e) => {
                    log_debug!("IMU read error: {}", e);
                    None
                }
            }
        } else {
            None
        };
        let frame = SensorFrame {
            imu,
            line: self.line.read(),
        };

        // ----- Control + actuation -----
        let out = self.state.step(&frame, dt, now_us);
        self.drive.apply(out.wheels);

        for event in out.events.iter() {
            send(tx, event);
        }
    }

    fn dispatch<W: fmt::Write>(
        &mut self,
        parsed: Result<Command, CommandError>,
        now_us: u64,
        tx: &mut W,
    ) {
        let result = parsed
            .map_err(DispatchError::from)
            .and_then(|cmd| self.state.handle(cmd, now_us).map_err(DispatchError::from));

        match result {
            Ok(reply) => send(tx, &reply),
            Err(e) => {
                log_debug!("command refused: {}", e);
                send(tx, &ErrorLine(&e));
            }
        }
    }

    /// Seconds since the previous cycle; the first cycle and clock glitches get the floor.
    fn elapsed(&mut self, now_us: u64) -> f32 {
        let dt = match self.last_cycle_us {
            Some(last) => now_us.saturating_sub(last) as f32 / 1_000_000.0,
            None => MIN_DT_S,
        };
        self.last_cycle_us = Some(now_us);
        dt.max(MIN_DT_S)
    }

    pub fn free(self) -> (I, L, MecanumDrive<FL, FR, RL, RR>) {
        (self.imu, self.line, self.drive)
    }
}
