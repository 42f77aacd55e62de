// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Direction + PWM H-bridge channel (L298N / TB6612 style).
//!
//! One GPIO selects rotation direction, one PWM output sets magnitude. A signed speed in
//! `[-MAX, MAX]` maps linearly onto `[0, max_duty]`.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

use crate::config::MAX_WHEEL_SPEED;
use crate::motors::WheelMotor;

/// Timer counts per PWM cycle for a carrier of `freq_hz`, also the full-scale duty.
///
/// Held within a 16-bit auto-reload so full scale fits the `u16` duty.
pub const fn pwm_period(timer_clk_hz: u32, freq_hz: u32) -> u16 {
    let ticks = timer_clk_hz / if freq_hz == 0 { 1 } else { freq_hz };
    if ticks < 2 {
        2
    } else if ticks > u16::MAX as u32 {
        u16::MAX
    } else {
        ticks as u16
    }
}

/// Logical drive direction of the channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// One motor channel of a direction/PWM H-bridge.
pub struct HBridge<DIR, PWM> {
    dir: DIR,
    pwm: PWM,
    direction: Direction,
}

impl<DIR, PWM> HBridge<DIR, PWM>
where
    DIR: OutputPin,
    PWM: PwmPin<Duty = u16>,
{
    /// Construct a channel, stopped and with PWM output enabled.
    pub fn new(dir: DIR, mut pwm: PWM) -> Self {
        pwm.set_duty(0);
        pwm.enable();
        let mut bridge = Self {
            dir,
            pwm,
            direction: Direction::Forward,
        };
        bridge.set_direction(Direction::Forward);
        bridge
    }

    fn set_direction(&mut self, direction: Direction) {
        // GPIO writes on this MCU are infallible; a failed write leaves the previous direction.
        let _ = match direction {
            Direction::Forward => self.dir.set_high(),
            Direction::Reverse => self.dir.set_low(),
        };
        self.direction = direction;
    }

    /// Duty for a speed magnitude in `0..=MAX`.
    fn duty_for(&self, magnitude: u16) -> u16 {
        let max_duty = self.pwm.get_max_duty() as u32;
        let m = magnitude.min(MAX_WHEEL_SPEED as u16) as u32;
        (m * max_duty / MAX_WHEEL_SPEED as u32) as u16
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn duty(&self) -> u16 {
        self.pwm.get_duty()
    }

    pub fn free(self) -> (DIR, PWM) {
        (self.dir, self.pwm)
    }
}

impl<DIR, PWM> WheelMotor for HBridge<DIR, PWM>
where
    DIR: OutputPin,
    PWM: PwmPin<Duty = u16>,
{
    fn set_speed(&mut self, speed: i16) {
        if speed == 0 {
            self.pwm.set_duty(0);
            return;
        }

        let direction = if speed > 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        if direction != self.direction {
            // Drop magnitude before flipping direction so the bridge never sees a hard reversal.
            self.pwm.set_duty(0);
            self.set_direction(direction);
        }

        let duty = self.duty_for(speed.unsigned_abs());
        self.pwm.set_duty(duty);
    }
}
