// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU Hardware Layer
//!
//! STM32F777 peripherals wrapped into the traits the control core consumes. Only built with the
//! `firmware` feature.
//!
//! - [`usart`] - Operator link: status writer and raw receiver.
//! - [`pwm`] - TIM4 four-channel motor PWM.
//! - [`adc`] - ADC1 and the reflectance array.
//! - [`clock`] - DWT-based monotonic microsecond clock.
//! - [`led`] - Status LEDs.
//! - [`pins`] - Board pin map.

pub mod adc;
pub mod clock;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod usart;

pub use adc::{Adc1, ReflectanceArray};
pub use clock::MonoClock;
pub use led::Led;
pub use pins::BoardPins;
pub use pwm::{PwmChannel, Tim4Pwm};
pub use usart::UsartTx;
