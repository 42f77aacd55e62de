// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Drivers sit above the MCU `hw` layer and below the control core. They are written against
//! `embedded-hal` traits so they build and test on the host.
//!
//! ## Existing drivers
//!
//! - [`hbridge`] – Direction GPIO + PWM H-bridge channel, one per wheel
//! - [`mpu6050`] – InvenSense MPU-6050 accelerometer / gyroscope over I2C

pub mod hbridge;
pub mod mpu6050;

pub use hbridge::{pwm_period, HBridge};
pub use mpu6050::Mpu6050;
