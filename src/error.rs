// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types for the control core.
//!
//! Nothing here is fatal to the cycle: protocol errors and refusals become `ERR` status lines,
//! sensor errors degrade the estimate. Only the safety supervisor overrides actuation.

use thiserror::Error;

/// A line from the serial link that could not be decoded into a command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command")]
    Unknown,

    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount { expected: u8, got: u8 },

    #[error("argument {index} is not a valid number")]
    InvalidNumber { index: u8 },

    #[error("expected ON or OFF")]
    InvalidToggle,

    #[error("motor index must be 0-3")]
    InvalidMotor,

    #[error("calibration time must be 1-30 s")]
    InvalidDuration,

    #[error("line exceeds buffer, discarded")]
    Overflow,

    #[error("line is not ASCII")]
    Encoding,
}

/// A well-formed command the controller refuses in its current state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejected {
    #[error("IMU unavailable")]
    ImuUnavailable,

    #[error("safety trip active, send REARM")]
    Tripped,

    #[error("tilt still above limit")]
    TiltUnsafe,

    #[error("busy calibrating IMU")]
    Calibrating,

    #[error("system halted: IMU initialization failed")]
    Halted,
}

/// IMU / sensor bus failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    #[error("sensor bus error")]
    Bus,

    #[error("unexpected device id {0:#04x}")]
    WrongDevice(u8),

    #[error("sensor not initialized")]
    NotInitialized,
}

/// Anything the dispatcher can answer with an `ERR` line.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    #[error("{0}")]
    Command(#[from] CommandError),

    #[error("{0}")]
    Rejected(#[from] Rejected),
}
