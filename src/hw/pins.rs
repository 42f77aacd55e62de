// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 motion-control board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, gpioe, Alternate, Analog, OpenDrain, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub i2c1: I2c1Pins,
    pub motors: MotorPins,
    pub line: LinePins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// MPU-6050 bus
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// H-bridge inputs: PWM magnitude on TIM4, one direction GPIO per wheel
pub struct MotorPins {
    pub fl_pwm: gpiod::PD12<Alternate<2>>, // TIM4_CH1
    pub fr_pwm: gpiod::PD13<Alternate<2>>, // TIM4_CH2
    pub rl_pwm: gpiod::PD14<Alternate<2>>, // TIM4_CH3
    pub rr_pwm: gpiod::PD15<Alternate<2>>, // TIM4_CH4
    pub fl_dir: gpioe::PE2<Output<PushPull>>,
    pub fr_dir: gpioe::PE3<Output<PushPull>>,
    pub rl_dir: gpioe::PE4<Output<PushPull>>,
    pub rr_dir: gpioe::PE5<Output<PushPull>>,
}

/// Reflectance sensors, left to right
pub struct LinePins {
    pub left: gpioa::PA0<Analog>,   // ADC1_IN0
    pub center: gpioa::PA1<Analog>, // ADC1_IN1
    pub right: gpioa::PA4<Analog>,  // ADC1_IN4
}

impl LinePins {
    /// ADC1 channels in left/center/right order.
    pub const CHANNELS: [u8; 3] = [0, 1, 4];
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                // Pulled down so an unconnected link reads low (see `usart::usart1_rx_idle_high`)
                rx: gpioa.pa10.into_alternate::<7>().internal_pull_down(true),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            motors: MotorPins {
                fl_pwm: gpiod.pd12.into_alternate::<2>(),
                fr_pwm: gpiod.pd13.into_alternate::<2>(),
                rl_pwm: gpiod.pd14.into_alternate::<2>(),
                rr_pwm: gpiod.pd15.into_alternate::<2>(),
                fl_dir: gpioe.pe2.into_push_pull_output(),
                fr_dir: gpioe.pe3.into_push_pull_output(),
                rl_dir: gpioe.pe4.into_push_pull_output(),
                rr_dir: gpioe.pe5.into_push_pull_output(),
            },

            line: LinePins {
                left: gpioa.pa0.into_analog(),
                center: gpioa.pa1.into_analog(),
                right: gpioa.pa4.into_analog(),
            },
        }
    }
}
