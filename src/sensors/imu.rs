// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Inertial estimation: complementary tilt filter and integrated yaw.
//!
//! Axis convention (robot frame): `x` forward, `y` left, `z` up. Tilt is pitch about `y`, positive
//! nose-down when `ax` is positive. Yaw is rotation about `z`, positive counter-clockwise.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::error::SensorError;

/// One raw inertial reading.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImuSample {
    /// Acceleration in g.
    pub accel: [f32; 3],
    /// Angular rate in deg/s.
    pub gyro: [f32; 3],
}

/// A source of inertial samples (accelerometer + gyroscope).
pub trait Imu {
    fn read(&mut self) -> Result<ImuSample, SensorError>;
}

/// Static offsets subtracted from every sample before filtering.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImuCalibration {
    /// deg/s
    pub gyro_bias: [f32; 3],
    /// g, relative to a level, stationary reading of `[0, 0, 1]`
    pub accel_offset: [f32; 3],
}

impl ImuCalibration {
    pub fn apply(&self, sample: &ImuSample) -> ImuSample {
        let mut out = *sample;
        for i in 0..3 {
            out.gyro[i] -= self.gyro_bias[i];
            out.accel[i] -= self.accel_offset[i];
        }
        out
    }
}

/// Fused orientation, in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OrientationEstimate {
    /// Best-effort fused pitch.
    pub tilt_deg: f32,
    /// Integrated heading, always in `(-180, 180]`.
    pub yaw_deg: f32,
}

/// Complementary filter for tilt plus dead-banded yaw integration.
#[derive(Clone, Debug)]
pub struct OrientationFilter {
    alpha: f32,
    yaw_deadband_dps: f32,
    calibration: ImuCalibration,
    estimate: OrientationEstimate,
    seeded: bool,
}

impl OrientationFilter {
    pub fn new(alpha: f32, yaw_deadband_dps: f32) -> Self {
        Self {
            alpha,
            yaw_deadband_dps,
            calibration: ImuCalibration::default(),
            estimate: OrientationEstimate::default(),
            seeded: false,
        }
    }

    pub fn set_calibration(&mut self, calibration: ImuCalibration) {
        self.calibration = calibration;
    }

    #[inline]
    pub fn calibration(&self) -> ImuCalibration {
        self.calibration
    }

    #[inline]
    pub fn estimate(&self) -> OrientationEstimate {
        self.estimate
    }

    /// Zero the yaw reference; tilt is re-seeded from the next accelerometer sample.
    pub fn reset(&mut self) {
        self.estimate = OrientationEstimate::default();
        self.seeded = false;
    }

    /// Fold one sample taken `dt` seconds after the previous one into the estimate.
    pub fn update(&mut self, raw: &ImuSample, dt: f32) -> OrientationEstimate {
        let sample = self.calibration.apply(raw);
        let accel_tilt = accel_tilt_deg(&sample.accel);

        if self.seeded {
            let gyro_tilt = self.estimate.tilt_deg + sample.gyro[1] * dt;
            self.estimate.tilt_deg = self.alpha * gyro_tilt + (1.0 - self.alpha) * accel_tilt;
        } else {
            // Start from the static reference instead of converging from zero.
            self.estimate.tilt_deg = accel_tilt;
            self.seeded = true;
        }

        let yaw_rate = sample.gyro[2];
        if yaw_rate.abs() >= self.yaw_deadband_dps {
            self.estimate.yaw_deg = wrap_degrees(self.estimate.yaw_deg + yaw_rate * dt);
        }

        self.estimate
    }
}

/// Static tilt from the gravity vector: `atan2(ax, sqrt(ay² + az²))` in degrees.
pub fn accel_tilt_deg(accel: &[f32; 3]) -> f32 {
    let [ax, ay, az] = *accel;
    ax.atan2((ay * ay + az * az).sqrt()).to_degrees()
}

/// Wrap an angle into `(-180, 180]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Averages stationary samples over a window to produce an [`ImuCalibration`].
#[derive(Clone, Debug)]
pub struct Calibrator {
    until_us: u64,
    gyro_sum: [f32; 3],
    accel_sum: [f32; 3],
    count: u32,
}

impl Calibrator {
    pub fn new(now_us: u64, seconds: u8) -> Self {
        Self {
            until_us: now_us + seconds as u64 * 1_000_000,
            gyro_sum: [0.0; 3],
            accel_sum: [0.0; 3],
            count: 0,
        }
    }

    /// Accumulate one raw (uncalibrated) sample.
    pub fn push(&mut self, sample: &ImuSample) {
        for i in 0..3 {
            self.gyro_sum[i] += sample.gyro[i];
            self.accel_sum[i] += sample.accel[i];
        }
        self.count += 1;
    }

    #[inline]
    pub fn is_done(&self, now_us: u64) -> bool {
        now_us >= self.until_us
    }

    #[inline]
    pub fn samples(&self) -> u32 {
        self.count
    }

    /// Mean offsets, or `None` if no sample arrived during the window.
    pub fn finish(&self) -> Option<ImuCalibration> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f32;
        let mut cal = ImuCalibration::default();
        for i in 0..3 {
            cal.gyro_bias[i] = self.gyro_sum[i] / n;
            cal.accel_offset[i] = self.accel_sum[i] / n;
        }
        // Gravity stays in the reference; only the deviation from level is an offset.
        cal.accel_offset[2] -= 1.0;
        Some(cal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn accel_tilt_matches_geometry() {
        assert!(accel_tilt_deg(&[0.0, 0.0, 1.0]).abs() < 1e-4);
        assert!((accel_tilt_deg(&tilted(20.0).accel) - 20.0).abs() < 1e-3);
        assert!((accel_tilt_deg(&[1.0, 0.0, 0.0]) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn wrap_stays_in_half_open_range() {
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert!((wrap_degrees(190.0) + 170.0).abs() < 1e-4);
        assert!((wrap_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-3);
        assert_eq!(wrap_degrees(0.0), 0.0);
    }

    #[test]
    fn first_sample_seeds_tilt() {
        let mut f = OrientationFilter::new(0.98, 0.5);
        let est = f.update(&tilted(15.0), 0.01);
        assert!((est.tilt_deg - 15.0).abs() < 1e-3);
    }

    #[test]
    fn blend_weights_gyro_and_accel() {
        let mut f = OrientationFilter::new(0.98, 0.5);
        f.update(&level(), 0.01);

        let mut s = tilted(10.0);
        s.gyro[1] = 100.0;
        let est = f.update(&s, 0.01);
        // 0.98 * (0 + 100 * 0.01) + 0.02 * 10
        assert!((est.tilt_deg - 1.18).abs() < 1e-3);
    }

    #[test]
    fn tilt_converges_back_to_level() {
        let mut f = OrientationFilter::new(0.98, 0.5);
        f.update(&tilted(12.0), 0.01);
        let mut last = f.estimate().tilt_deg;
        for _ in 0..500 {
            let t = f.update(&level(), 0.01).tilt_deg;
            assert!(t <= last);
            last = t;
        }
        assert!(last.abs() < 0.01);
    }

    #[test]
    fn yaw_deadband_suppresses_drift() {
        let mut f = OrientationFilter::new(0.98, 0.5);
        let mut s = level();
        s.gyro[2] = 0.4;
        for _ in 0..1000 {
            f.update(&s, 0.01);
        }
        assert_eq!(f.estimate().yaw_deg, 0.0);
    }

    #[test]
    fn yaw_integrates_and_wraps() {
        let mut f = OrientationFilter::new(0.98, 0.5);
        let mut s = level();
        s.gyro[2] = 90.0;
        for _ in 0..1000 {
            let yaw = f.update(&s, 0.01).yaw_deg;
            assert!(yaw > -180.0 && yaw <= 180.0, "yaw {yaw} out of range");
        }
        // 900 degrees total is 180 modulo 360, up to float accumulation.
        let yaw = f.estimate().yaw_deg;
        assert!(yaw > 170.0 || yaw < -170.0);
    }

    #[test]
    fn calibration_is_subtracted() {
        let mut f = OrientationFilter::new(0.98, 0.5);
        f.set_calibration(ImuCalibration {
            gyro_bias: [0.0, 0.0, 3.0],
            accel_offset: [0.1, 0.0, 0.0],
        });
        let mut s = level();
        s.accel[0] = 0.1;
        s.gyro[2] = 3.0;
        let est = f.update(&s, 0.01);
        assert!(est.tilt_deg.abs() < 1e-3);
        assert_eq!(est.yaw_deg, 0.0);
    }

    #[test]
    fn calibrator_averages_window() {
        let mut c = Calibrator::new(0, 1);
        assert_eq!(c.finish(), None);

        let mut s = level();
        s.gyro = [1.0, -2.0, 0.5];
        s.accel = [0.02, -0.01, 1.03];
        for _ in 0..10 {
            c.push(&s);
        }
        assert!(!c.is_done(999_999));
        assert!(c.is_done(1_000_000));

        let cal = c.finish().unwrap();
        assert!((cal.gyro_bias[1] + 2.0).abs() < 1e-5);
        assert!((cal.accel_offset[2] - 0.03).abs() < 1e-4);
    }
}
