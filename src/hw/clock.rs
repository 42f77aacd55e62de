// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic microsecond clock from the DWT cycle counter.
//!
//! The 32-bit counter wraps every ~20 s at 216 MHz; [`MonoClock::now_us`] extends it to 64 bits and
//! must be called at least once per wrap, which the control cycle guarantees.

use cortex_m::peripheral::{DCB, DWT};

pub struct MonoClock {
    cycles_per_us: u32,
    last: u32,
    high: u64,
}

impl MonoClock {
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32) -> Self {
        dcb.enable_trace();
        DWT::unlock();
        dwt.enable_cycle_counter();
        Self {
            cycles_per_us: (sysclk_hz / 1_000_000).max(1),
            last: DWT::cycle_count(),
            high: 0,
        }
    }

    fn cycles(&mut self) -> u64 {
        let now = DWT::cycle_count();
        if now < self.last {
            self.high += 1 << 32;
        }
        self.last = now;
        self.high | now as u64
    }

    pub fn now_us(&mut self) -> u64 {
        self.cycles() / self.cycles_per_us as u64
    }

    /// Busy-wait until `deadline_us`.
    pub fn wait_until(&mut self, deadline_us: u64) {
        while self.now_us() < deadline_us {
            cortex_m::asm::nop();
        }
    }
}
