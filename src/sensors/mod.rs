// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Sensor Acquisition & Filtering
//!
//! Turns raw samples into the estimates the control loops consume. Sources are traits so the
//! filters run unchanged against real drivers or test fixtures.
//!
//! ## Modules
//!
//! - [`imu`] - Complementary tilt filter, dead-banded yaw integration, gyro/accel calibration.
//! - [`line`] - Three-channel reflectance smoothing, polarity detection and centroid position.
//! - [`odometry`] - Accelerometer dead reckoning in the world frame.

pub mod imu;
pub mod line;
pub mod odometry;

pub use imu::{Imu, ImuCalibration, ImuSample, OrientationEstimate, OrientationFilter};
pub use line::{LinePosition, LineSensor, LineTracker};
pub use odometry::DeadReckoning;
