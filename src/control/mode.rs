// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Driving mode of the robot.

/// Travel direction while following a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineDirection {
    Forward,
    Backward,
}

impl LineDirection {
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            LineDirection::Forward => 1,
            LineDirection::Backward => -1,
        }
    }
}

/// Which closed loops shape the wheel output.
///
/// Line following and the inertial loops are separate variants, so the two kinds of correction can
/// never be mixed into the same output.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveMode {
    /// Base speeds only.
    #[default]
    Manual,
    /// Base speeds plus the balance correction.
    Balance,
    /// Base speeds plus the heading correction toward `target_deg`.
    HeadingHold { target_deg: f32 },
    /// Balance and heading corrections together.
    BalanceHeading { target_deg: f32 },
    /// Reflectance-guided driving at the configured base speed.
    LineFollow { direction: LineDirection },
}

impl DriveMode {
    #[inline]
    pub fn balancing(&self) -> bool {
        matches!(self, DriveMode::Balance | DriveMode::BalanceHeading { .. })
    }

    /// Heading target if heading hold is engaged.
    #[inline]
    pub fn heading_target(&self) -> Option<f32> {
        match *self {
            DriveMode::HeadingHold { target_deg } | DriveMode::BalanceHeading { target_deg } => {
                Some(target_deg)
            }
            _ => None,
        }
    }

    #[inline]
    pub fn line_direction(&self) -> Option<LineDirection> {
        match *self {
            DriveMode::LineFollow { direction } => Some(direction),
            _ => None,
        }
    }

    /// Whether this mode consumes the IMU estimate.
    #[inline]
    pub fn needs_imu(&self) -> bool {
        self.balancing() || self.heading_target().is_some()
    }

    /// The same mode with balancing switched on or off, keeping any heading target.
    pub fn with_balance(self, on: bool) -> DriveMode {
        match (self.heading_target(), on) {
            (Some(target_deg), true) => DriveMode::BalanceHeading { target_deg },
            (Some(target_deg), false) => DriveMode::HeadingHold { target_deg },
            (None, true) => DriveMode::Balance,
            (None, false) => DriveMode::Manual,
        }
    }

    /// The same mode with heading hold set to `target`, keeping balancing.
    pub fn with_heading(self, target: Option<f32>) -> DriveMode {
        match (self.balancing(), target) {
            (true, Some(target_deg)) => DriveMode::BalanceHeading { target_deg },
            (false, Some(target_deg)) => DriveMode::HeadingHold { target_deg },
            (true, None) => DriveMode::Balance,
            (false, None) => DriveMode::Manual,
        }
    }

    /// Short tag used in status and telemetry lines.
    pub fn label(&self) -> &'static str {
        match self {
            DriveMode::Manual => "MANUAL",
            DriveMode::Balance => "BALANCE",
            DriveMode::HeadingHold { .. } => "HEADING",
            DriveMode::BalanceHeading { .. } => "BALANCE+HEADING",
            DriveMode::LineFollow {
                direction: LineDirection::Forward,
            } => "LINE_FWD",
            DriveMode::LineFollow {
                direction: LineDirection::Backward,
            } => "LINE_BWD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_and_heading_compose() {
        let m = DriveMode::Manual.with_balance(true).with_heading(Some(45.0));
        assert_eq!(m, DriveMode::BalanceHeading { target_deg: 45.0 });
        assert!(m.needs_imu());

        let m = m.with_balance(false);
        assert_eq!(m, DriveMode::HeadingHold { target_deg: 45.0 });
        assert_eq!(m.with_heading(None), DriveMode::Manual);
    }

    #[test]
    fn line_follow_drops_inertial_loops() {
        let m = DriveMode::LineFollow {
            direction: LineDirection::Forward,
        };
        assert!(!m.needs_imu());
        assert_eq!(m.with_balance(true), DriveMode::Balance);
        assert_eq!(m.line_direction(), Some(LineDirection::Forward));
    }
}
