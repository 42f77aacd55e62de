// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Closed-loop building blocks between the sensor estimates and the wheels.
//!
//! ## Modules
//!
//! - [`pid`] - General-purpose PID controller implementation.
//! - [`mode`] - The tagged driving mode that decides which loops run.
//! - [`loops`] - Balance, heading-hold and line-tracking loops with reset-on-transition.
//! - [`mixer`] - Combines base command and corrections into clamped wheel speeds.

pub mod loops;
pub mod mixer;
pub mod mode;
pub mod pid;

pub use loops::{ControlLoops, Corrections};
pub use mode::{DriveMode, LineDirection};
pub use pid::Pid;
