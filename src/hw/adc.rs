// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 support for STM32F7 using direct PAC register access, and the reflectance array on top.
//!
//! Blocking single-channel conversions; three conversions per cycle take a few microseconds.

use stm32f7xx_hal::pac;

use crate::config::LINE_SENSOR_COUNT;
use crate::sensors::LineSensor;

pub struct Adc1 {
    adc: pac::ADC1,
}

impl Adc1 {
    /// Enable the clock and power up ADC1: 12-bit, right-aligned, software trigger.
    pub fn new(adc: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        // ADC prescaler: PCLK2 / 4
        common.ccr.modify(|_, w| w.adcpre().div4());

        // Power off to configure
        adc.cr2.modify(|_, w| w.adon().clear_bit());

        adc.cr1.modify(|_, w| w.res().bits(0b00));
        adc.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });

        // Long sample time on every regular channel 0-9 for high-impedance phototransistors
        adc.smpr2.modify(|_, w| unsafe { w.bits(0x3FFF_FFFF) });

        // Sequence length = 1 conversion
        adc.sqr1.modify(|_, w| w.l().bits(0));

        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc }
    }

    /// Convert one channel.
    pub fn read(&mut self, channel: u8) -> u16 {
        self.adc
            .sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });

        self.adc.cr2.modify(|_, w| w.swstart().set_bit());
        while self.adc.sr.read().eoc().bit_is_clear() {}

        self.adc.dr.read().data().bits() as u16
    }

    #[inline]
    pub fn free(self) -> pac::ADC1 {
        self.adc
    }
}

/// Left / center / right phototransistors on three ADC1 channels.
pub struct ReflectanceArray {
    adc: Adc1,
    channels: [u8; LINE_SENSOR_COUNT],
}

impl ReflectanceArray {
    pub fn new(adc: Adc1, channels: [u8; LINE_SENSOR_COUNT]) -> Self {
        Self { adc, channels }
    }
}

impl LineSensor for ReflectanceArray {
    fn read(&mut self) -> [u16; LINE_SENSOR_COUNT] {
        let mut out = [0; LINE_SENSOR_COUNT];
        for (o, &ch) in out.iter_mut().zip(self.channels.iter()) {
            *o = self.adc.read(ch);
        }
        out
    }
}
