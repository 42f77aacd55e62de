// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel positions and signed per-wheel speed commands.

use crate::config::{MAX_WHEEL_SPEED, WHEEL_COUNT};

/// Wheel position on the chassis. The discriminant is the protocol / array index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wheel {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Wheel {
    pub const ALL: [Wheel; WHEEL_COUNT] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, Wheel::FrontLeft | Wheel::RearLeft)
    }

    pub fn label(self) -> &'static str {
        match self {
            Wheel::FrontLeft => "FL",
            Wheel::FrontRight => "FR",
            Wheel::RearLeft => "RL",
            Wheel::RearRight => "RR",
        }
    }
}

/// Signed speed per wheel in FL/FR/RL/RR order, always within `[-MAX, MAX]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelSpeeds([i16; WHEEL_COUNT]);

impl WheelSpeeds {
    pub const ZERO: WheelSpeeds = WheelSpeeds([0; WHEEL_COUNT]);

    /// Build from raw values, clamping each into `[-MAX, MAX]`.
    pub fn new(raw: [i32; WHEEL_COUNT]) -> Self {
        let mut out = [0; WHEEL_COUNT];
        for (o, r) in out.iter_mut().zip(raw) {
            *o = clamp_speed(r);
        }
        Self(out)
    }

    /// Speed for one wheel, all others zero.
    pub fn single(wheel: Wheel, speed: i16) -> Self {
        let mut out = Self::ZERO;
        out.0[wheel.index()] = speed.clamp(-MAX_WHEEL_SPEED, MAX_WHEEL_SPEED);
        out
    }

    /// Same speed on both left wheels and on both right wheels.
    pub fn sides(left: i32, right: i32) -> Self {
        Self::new([left, right, left, right])
    }

    #[inline]
    pub fn get(&self, wheel: Wheel) -> i16 {
        self.0[wheel.index()]
    }

    #[inline]
    pub fn as_array(&self) -> [i16; WHEEL_COUNT] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&s| s == 0)
    }
}

/// Clamp an integer speed into the wheel range.
#[inline]
pub fn clamp_speed(raw: i32) -> i16 {
    raw.clamp(-(MAX_WHEEL_SPEED as i32), MAX_WHEEL_SPEED as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_each_wheel_independently() {
        let s = WheelSpeeds::new([300, -300, 100, -255]);
        assert_eq!(s.as_array(), [255, -255, 100, -255]);
    }

    #[test]
    fn wheel_index_round_trips() {
        for w in Wheel::ALL {
            assert_eq!(Wheel::from_index(w.index() as u8), Some(w));
        }
        assert_eq!(Wheel::from_index(4), None);
    }

    #[test]
    fn sides_fill_left_and_right_pairs() {
        let s = WheelSpeeds::sides(50, -50);
        assert_eq!(s.get(Wheel::FrontLeft), 50);
        assert_eq!(s.get(Wheel::RearLeft), 50);
        assert_eq!(s.get(Wheel::FrontRight), -50);
        assert_eq!(s.get(Wheel::RearRight), -50);
    }
}
