// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel PWM on TIM4 via direct PAC register access.
//!
//! TIM4 CH1..CH4 (PD12..PD15) drive the magnitude input of the four H-bridge channels. Each
//! channel is handed out as its own [`PwmChannel`] implementing `embedded_hal::PwmPin`, so the
//! drivers never see the timer.

use embedded_hal::PwmPin;
use stm32f7xx_hal::pac;

use crate::drivers::pwm_period;

/// Motor PWM carrier frequency.
pub const PWM_FREQ_HZ: u32 = 20_000;

/// One TIM4 compare channel, `C` in `1..=4`.
pub struct PwmChannel<const C: u8> {
    max_duty: u16,
}

/// The four channels, in FL/FR/RL/RR wiring order.
pub struct Tim4Pwm {
    pub ch1: PwmChannel<1>,
    pub ch2: PwmChannel<2>,
    pub ch3: PwmChannel<3>,
    pub ch4: PwmChannel<4>,
}

impl Tim4Pwm {
    /// Configure TIM4 for edge-aligned PWM mode 1 on all channels, outputs disabled, duty 0.
    ///
    /// `timer_clk_hz` is the APB1 timer clock.
    pub fn new(tim: pac::TIM4, timer_clk_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // No prescaler; period sets the duty resolution.
        let max_duty = pwm_period(timer_clk_hz, PWM_FREQ_HZ);
        tim.psc.write(|w| unsafe { w.bits(0) });
        tim.arr.write(|w| unsafe { w.bits(max_duty as u32 - 1) });

        // OCxM = 110 (PWM mode 1), OCxPE = 1 (preload)
        const PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3);
        let both = PWM1_PRELOAD | (PWM1_PRELOAD << 8);
        tim.ccmr1_output()
            .modify(|r, w| unsafe { w.bits((r.bits() & !0xFFFF) | both) });
        tim.ccmr2_output()
            .modify(|r, w| unsafe { w.bits((r.bits() & !0xFFFF) | both) });

        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });
        tim.ccr3.write(|w| unsafe { w.bits(0) });
        tim.ccr4.write(|w| unsafe { w.bits(0) });

        // ARPE, load preloads, start
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self {
            ch1: PwmChannel { max_duty },
            ch2: PwmChannel { max_duty },
            ch3: PwmChannel { max_duty },
            ch4: PwmChannel { max_duty },
        }
    }
}

#[inline]
fn tim4() -> &'static pac::tim3::RegisterBlock {
    unsafe { &*pac::TIM4::ptr() }
}

impl<const C: u8> PwmPin for PwmChannel<C> {
    type Duty = u16;

    fn disable(&mut self) {
        let bit = 1 << ((C as u32 - 1) * 4);
        tim4().ccer.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
    }

    fn enable(&mut self) {
        let bit = 1 << ((C as u32 - 1) * 4);
        tim4().ccer.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
    }

    fn get_duty(&self) -> u16 {
        let t = tim4();
        let raw = match C {
            1 => t.ccr1.read().bits(),
            2 => t.ccr2.read().bits(),
            3 => t.ccr3.read().bits(),
            _ => t.ccr4.read().bits(),
        };
        raw as u16
    }

    fn get_max_duty(&self) -> u16 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u16) {
        let t = tim4();
        let duty = duty.min(self.max_duty) as u32;
        match C {
            1 => t.ccr1.write(|w| unsafe { w.bits(duty) }),
            2 => t.ccr2.write(|w| unsafe { w.bits(duty) }),
            3 => t.ccr3.write(|w| unsafe { w.bits(duty) }),
            _ => t.ccr4.write(|w| unsafe { w.bits(duty) }),
        }
    }
}
