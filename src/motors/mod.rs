// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuation Layer
//!
//! Wheel-level abstractions that sit above the device drivers in `drivers`.
//!
//! ## Modules
//!
//! - [`wheel`] - Wheel indexing and the signed per-wheel speed set.
//! - [`drive`] - Four-channel mecanum drive built on any [`WheelMotor`].

pub mod drive;
pub mod wheel;

pub use drive::{MecanumDrive, WheelMotor};
pub use wheel::{Wheel, WheelSpeeds};
