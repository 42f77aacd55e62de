// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel mecanum drive.
//!
//! Open loop: each channel is written once per cycle and never read back. Mounting inversion is
//! applied here so everything above sees "positive = wheel rolls forward".

use crate::config::WHEEL_COUNT;
use crate::motors::{Wheel, WheelSpeeds};

/// A single wheel channel that accepts a signed speed in `[-MAX, MAX]`.
pub trait WheelMotor {
    fn set_speed(&mut self, speed: i16);

    /// Remove drive from the wheel.
    fn stop(&mut self) {
        self.set_speed(0);
    }
}

/// The four wheel channels in FL/FR/RL/RR order.
pub struct MecanumDrive<FL, FR, RL, RR> {
    fl: FL,
    fr: FR,
    rl: RL,
    rr: RR,
    inverted: [bool; WHEEL_COUNT],
    last: WheelSpeeds,
}

impl<FL, FR, RL, RR> MecanumDrive<FL, FR, RL, RR>
where
    FL: WheelMotor,
    FR: WheelMotor,
    RL: WheelMotor,
    RR: WheelMotor,
{
    /// Wrap four channels and stop them all.
    pub fn new(fl: FL, fr: FR, rl: RL, rr: RR, inverted: [bool; WHEEL_COUNT]) -> Self {
        let mut drive = Self {
            fl,
            fr,
            rl,
            rr,
            inverted,
            last: WheelSpeeds::ZERO,
        };
        drive.stop();
        drive
    }

    /// Write all four channels.
    pub fn apply(&mut self, speeds: WheelSpeeds) {
        for wheel in Wheel::ALL {
            let mut s = speeds.get(wheel);
            if self.inverted[wheel.index()] {
                s = -s;
            }
            self.channel(wheel).set_speed(s);
        }
        self.last = speeds;
    }

    /// Zero every channel.
    pub fn stop(&mut self) {
        self.fl.stop();
        self.fr.stop();
        self.rl.stop();
        self.rr.stop();
        self.last = WheelSpeeds::ZERO;
    }

    /// Last commanded speeds, before mounting inversion.
    #[inline]
    pub fn last(&self) -> WheelSpeeds {
        self.last
    }

    fn channel(&mut self, wheel: Wheel) -> &mut dyn WheelMotor {
        match wheel {
            Wheel::FrontLeft => &mut self.fl,
            Wheel::FrontRight => &mut self.fr,
            Wheel::RearLeft => &mut self.rl,
            Wheel::RearRight => &mut self.rr,
        }
    }

    pub fn free(self) -> (FL, FR, RL, RR) {
        (self.fl, self.fr, self.rl, self.rr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        speed: i16,
        writes: u32,
    }

    impl WheelMotor for Recorder {
        fn set_speed(&mut self, speed: i16) {
            self.speed = speed;
            self.writes += 1;
        }
    }

    #[test]
    fn apply_honours_inversion() {
        let mut drive = MecanumDrive::new(
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            [false, true, false, true],
        );
        drive.apply(WheelSpeeds::new([100, 100, -50, -50]));
        assert_eq!(drive.last().as_array(), [100, 100, -50, -50]);

        let (fl, fr, rl, rr) = drive.free();
        assert_eq!((fl.speed, fr.speed, rl.speed, rr.speed), (100, -100, -50, 50));
        // One stop at construction, one apply.
        assert_eq!(fl.writes, 2);
    }

    #[test]
    fn stop_zeroes_every_channel() {
        let mut drive = MecanumDrive::new(
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            [false; WHEEL_COUNT],
        );
        drive.apply(WheelSpeeds::new([10, 20, 30, 40]));
        drive.stop();
        assert!(drive.last().is_zero());
        let (fl, fr, rl, rr) = drive.free();
        assert_eq!([fl.speed, fr.speed, rl.speed, rr.speed], [0; 4]);
    }
}
