// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tip-over supervisor.
//!
//! Evaluated every cycle before the control loops. While tripped, the scheduler writes zero to every
//! wheel and skips the loops entirely. How the trip clears depends on [`RearmPolicy`].
//!
//! IMU read failures are reported here as well. They never trip the robot: after `fault_limit`
//! consecutive failures the supervisor raises a sensor fault, and the scheduler drops the modes that
//! depend on the inertial estimate until reads resume.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::RearmPolicy;
use crate::error::Rejected;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyState {
    Normal,
    Tripped,
}

impl SafetyState {
    pub fn label(self) -> &'static str {
        match self {
            SafetyState::Normal => "NORMAL",
            SafetyState::Tripped => "TRIPPED",
        }
    }
}

/// Outcome of one supervisor evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Normal operation.
    Clear,
    /// Tilt crossed the limit this cycle.
    Trip,
    /// Still tripped from an earlier cycle.
    Holding,
    /// Automatic policy only: tilt back in range, trip cleared this cycle.
    Recovered,
}

impl Verdict {
    /// Motors must be held at zero this cycle.
    #[inline]
    pub fn blocks_motion(self) -> bool {
        matches!(self, Verdict::Trip | Verdict::Holding)
    }
}

/// Change in the sensor fault flag caused by one IMU read report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensorTransition {
    Unchanged,
    /// Consecutive failures reached the limit.
    Faulted,
    /// First good read after a fault.
    Recovered,
}

pub struct SafetySupervisor {
    threshold_deg: f32,
    policy: RearmPolicy,
    state: SafetyState,

    fault_limit: u8,
    read_failures: u8,
    sensor_fault: bool,
}

impl SafetySupervisor {
    pub fn new(threshold_deg: f32, policy: RearmPolicy, fault_limit: u8) -> Self {
        Self {
            threshold_deg,
            policy,
            state: SafetyState::Normal,

            fault_limit: fault_limit.max(1),
            read_failures: 0,
            sensor_fault: false,
        }
    }

    #[inline]
    pub fn state(&self) -> SafetyState {
        self.state
    }

    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.state == SafetyState::Tripped
    }

    #[inline]
    pub fn policy(&self) -> RearmPolicy {
        self.policy
    }

    /// The inertial estimate is stale: too many consecutive IMU reads failed.
    #[inline]
    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    /// Record the outcome of this cycle's IMU read.
    pub fn report_imu_read(&mut self, ok: bool) -> SensorTransition {
        if ok {
            self.read_failures = 0;
            if self.sensor_fault {
                self.sensor_fault = false;
                log_info!("IMU reads resumed");
                return SensorTransition::Recovered;
            }
            return SensorTransition::Unchanged;
        }

        self.read_failures = self.read_failures.saturating_add(1);
        if self.read_failures == 1 {
            log_warn!("IMU read failed, holding last estimate");
        }
        if self.read_failures >= self.fault_limit && !self.sensor_fault {
            self.sensor_fault = true;
            log_error!("IMU failed {} consecutive reads", self.read_failures);
            return SensorTransition::Faulted;
        }
        SensorTransition::Unchanged
    }

    /// NaN counts as over the limit.
    fn over_limit(&self, tilt_deg: f32) -> bool {
        !(tilt_deg.abs() <= self.threshold_deg)
    }

    pub fn evaluate(&mut self, tilt_deg: f32) -> Verdict {
        let over = self.over_limit(tilt_deg);
        match self.state {
            SafetyState::Normal if over => {
                self.state = SafetyState::Tripped;
                log_warn!("safety trip: tilt {} deg", tilt_deg);
                Verdict::Trip
            }
            SafetyState::Normal => Verdict::Clear,
            SafetyState::Tripped if self.policy == RearmPolicy::Automatic && !over => {
                self.state = SafetyState::Normal;
                log_info!("safety trip cleared automatically");
                Verdict::Recovered
            }
            SafetyState::Tripped => Verdict::Holding,
        }
    }

    /// Operator re-arm. Succeeds immediately when not tripped.
    pub fn rearm(&mut self, tilt_deg: f32) -> Result<(), Rejected> {
        if self.state == SafetyState::Normal {
            return Ok(());
        }
        if self.over_limit(tilt_deg) {
            return Err(Rejected::TiltUnsafe);
        }
        self.state = SafetyState::Normal;
        log_info!("safety re-armed at tilt {} deg", tilt_deg);
        Ok(())
    }
}
