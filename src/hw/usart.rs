// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer for the operator link.
//!
//! The receive half is the HAL's `Rx`, which already implements `embedded_hal::serial::Read<u8>`
//! and is polled without blocking by the cycle. The transmit half is wrapped here so status lines
//! can be written with `write!` / `writeln!`; `\n` goes out as `\r\n` for terminal users.
//!
//! To access the link from a host machine:
//! ```text
//! $ screen /dev/ttyUSB0 115200
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    pac,
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

pub struct UsartTx<U: Instance> {
    tx: Tx<U>,
}

/// Split a configured serial port into the status writer and the raw receiver.
pub fn split<U: Instance, PINS: Pins<U>>(serial: Serial<U, PINS>) -> (UsartTx<U>, Rx<U>) {
    let (tx, rx) = serial.split();
    (UsartTx { tx }, rx)
}

impl<U: Instance> UsartTx<U> {
    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            if b == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(b);
        }
    }
}

impl<U: Instance> fmt::Write for UsartTx<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        UsartTx::write_str(self, s);
        Ok(())
    }
}

/// USART1 RX (PA10) reads high when a host adapter is driving the idle line.
///
/// Requires the pull-down set up in [`crate::hw::pins`], so a floating, unconnected pin reads low.
pub fn usart1_rx_idle_high() -> bool {
    let gpioa = unsafe { &*pac::GPIOA::ptr() };
    gpioa.idr.read().bits() & (1 << 10) != 0
}
