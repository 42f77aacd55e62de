// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Start-up sequencing: bounded wait for the host link, IMU bring-up outcome.

use crate::error::SensorError;
use crate::robot::ImuHealth;

/// How the wait for the host link ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    Ready,
    /// Timed out; boot continues and the link is used whenever it shows up.
    TimedOut,
}

/// Poll `ready` until it reports true or `timeout_ms` elapses on `now_us`.
pub fn wait_for_link<R, C>(mut ready: R, mut now_us: C, timeout_ms: u32) -> LinkStatus
where
    R: FnMut() -> bool,
    C: FnMut() -> u64,
{
    let start = now_us();
    let limit = timeout_ms as u64 * 1_000;
    loop {
        if ready() {
            log_info!("host link ready");
            return LinkStatus::Ready;
        }
        if now_us().saturating_sub(start) >= limit {
            log_warn!("host link not detected after {} ms, continuing", timeout_ms);
            return LinkStatus::TimedOut;
        }
    }
}

/// Map the IMU initialization result onto the health the controller runs with.
pub fn imu_health(init: Result<(), SensorError>, required: bool) -> ImuHealth {
    match init {
        Ok(()) => ImuHealth::Available,
        Err(e) if required => {
            log_error!("IMU init failed ({}), halting motor output", e);
            ImuHealth::Halted
        }
        Err(e) => {
            log_warn!("IMU init failed ({}), balance and heading unavailable", e);
            ImuHealth::Absent
        }
    }
}
