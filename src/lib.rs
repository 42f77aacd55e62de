// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Mecabot Firmware
//!
//! Real-time motion-control core for a four-wheel mecanum robot, written in Rust, targeting an
//! STM32F777 MCU.
//!
//! One cooperative cycle drains operator commands from the serial link, fuses IMU and reflectance
//! readings, runs the safety supervisor, evaluates the balance / heading / line PID loops, mixes
//! the result into four wheel commands and drives the H-bridges.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Compile-time limits and tunable controller parameters |
//! | [`sensors`] | Complementary tilt filter, yaw integration, line tracker, dead reckoning |
//! | [`control`] | PID, the control-loop bank and the motion mixer |
//! | [`motors`] | Wheel indexing and the four-channel actuation layer |
//! | [`safety`] | Tip-over supervisor |
//! | [`protocol`] | Line-oriented serial command parser and status replies |
//! | [`robot`] | Controller state and the main cycle scheduler |
//! | [`drivers`] | Device drivers (MPU-6050, direction + PWM H-bridge) |
//! | `hw` | MCU-level wrappers around USART, ADC, timers (`firmware` feature) |
//!
//! ## Getting Started
//!
//! Run the host test suite:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo flash
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod logging;

pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod motors;
pub mod protocol;
pub mod robot;
pub mod safety;
pub mod sensors;

#[cfg(feature = "firmware")]
pub mod hw;
