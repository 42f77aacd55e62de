// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Operator commands and their text encoding.
//!
//! A command is one ASCII line of comma-separated tokens. The keyword is case-insensitive and
//! whitespace around tokens is ignored.
//!
//! | Line | Command |
//! | ---- | ------- |
//! | `s1,s2,s3,s4` / `MOVE,fl,fr,rl,rr` | [`Command::Move`] |
//! | `DRIVE,vx,vy,omega` | [`Command::Drive`] |
//! | `BALANCE,ON\|OFF` | [`Command::Balance`] |
//! | `HEADING,<deg>` / `HEADING,OFF` | [`Command::Heading`] / [`Command::HeadingOff`] |
//! | `FORWARD` `F` / `BACKWARD` `B` | [`Command::LineFollow`] |
//! | `STOP` `S` | [`Command::Stop`] |
//! | `TEST,motor,speed,ms` | [`Command::Test`] |
//! | `REARM` | [`Command::Rearm`] |
//! | `VERBOSE,ON\|OFF` | [`Command::Verbose`] |
//! | `STATUS` | [`Command::Status`] |
//! | `GET_SENSORS` | [`Command::GetSensors`] |
//! | `CALIBRATE_IMU,<s>` | [`Command::CalibrateImu`] |
//! | `GET_IMU_CALIBRATION` | [`Command::GetImuCalibration`] |

use heapless::Vec;

use crate::config::{CALIBRATION_MAX_SECONDS, MAX_COMMAND_TOKENS, TEST_MAX_DURATION_MS, WHEEL_COUNT};
use crate::control::LineDirection;
use crate::error::CommandError;
use crate::motors::wheel::clamp_speed;
use crate::motors::{Wheel, WheelSpeeds};

/// A validated operator intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Set the four base wheel speeds directly (clamped to range).
    Move(WheelSpeeds),
    /// Set base wheel speeds from forward / strafe / rotate intents.
    Drive { vx: i32, vy: i32, omega: i32 },
    Balance(bool),
    /// Hold this heading, in degrees.
    Heading(f32),
    HeadingOff,
    LineFollow(LineDirection),
    Stop,
    /// Run one wheel for a bounded time, then stop it.
    Test {
        wheel: Wheel,
        speed: i16,
        duration_ms: u32,
    },
    Rearm,
    Verbose(bool),
    Status,
    GetSensors,
    CalibrateImu { seconds: u8 },
    GetImuCalibration,
}

impl Command {
    /// Decode one line (without its terminator).
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let total = line.split(',').count();
        let mut tokens: Vec<&str, MAX_COMMAND_TOKENS> = Vec::new();
        for token in line.split(',').take(MAX_COMMAND_TOKENS) {
            // Cannot fail: `take` bounds the count to the capacity.
            let _ = tokens.push(token.trim());
        }
        let args = Args {
            tokens: &tokens[1..],
            total: total - 1,
        };
        let keyword = tokens[0];
        let is = |name: &str| keyword.eq_ignore_ascii_case(name);

        if is("MOVE") {
            return args.speeds().map(Command::Move);
        }
        if is("DRIVE") {
            args.expect(3)?;
            return Ok(Command::Drive {
                vx: args.int(0)?,
                vy: args.int(1)?,
                omega: args.int(2)?,
            });
        }
        if is("BALANCE") {
            args.expect(1)?;
            return args.toggle(0).map(Command::Balance);
        }
        if is("HEADING") {
            args.expect(1)?;
            if args.tokens[0].eq_ignore_ascii_case("OFF") {
                return Ok(Command::HeadingOff);
            }
            return args.float(0).map(Command::Heading);
        }
        if is("FORWARD") || is("F") {
            args.expect(0)?;
            return Ok(Command::LineFollow(LineDirection::Forward));
        }
        if is("BACKWARD") || is("B") {
            args.expect(0)?;
            return Ok(Command::LineFollow(LineDirection::Backward));
        }
        if is("STOP") || is("S") {
            args.expect(0)?;
            return Ok(Command::Stop);
        }
        if is("TEST") {
            return args.test();
        }
        if is("REARM") {
            args.expect(0)?;
            return Ok(Command::Rearm);
        }
        if is("VERBOSE") {
            args.expect(1)?;
            return args.toggle(0).map(Command::Verbose);
        }
        if is("STATUS") {
            args.expect(0)?;
            return Ok(Command::Status);
        }
        if is("GET_SENSORS") {
            args.expect(0)?;
            return Ok(Command::GetSensors);
        }
        if is("CALIBRATE_IMU") {
            args.expect(1)?;
            let seconds = args.int(0)?;
            if !(1..=CALIBRATION_MAX_SECONDS as i32).contains(&seconds) {
                return Err(CommandError::InvalidDuration);
            }
            return Ok(Command::CalibrateImu {
                seconds: seconds as u8,
            });
        }
        if is("GET_IMU_CALIBRATION") {
            args.expect(0)?;
            return Ok(Command::GetImuCalibration);
        }

        // Bare `s1,s2,s3,s4` movement shorthand: every token is an argument.
        if total == WHEEL_COUNT {
            let bare = Args {
                tokens: &tokens,
                total,
            };
            return bare.speeds().map(Command::Move);
        }

        Err(CommandError::Unknown)
    }
}

/// Argument tokens after the keyword.
struct Args<'a, 'b> {
    tokens: &'b [&'a str],
    /// Count before truncation to the token capacity.
    total: usize,
}

impl Args<'_, '_> {
    fn expect(&self, expected: u8) -> Result<(), CommandError> {
        if self.total != expected as usize {
            return Err(CommandError::ArgumentCount {
                expected,
                got: self.total.min(u8::MAX as usize) as u8,
            });
        }
        Ok(())
    }

    /// Reported indices are 1-based, counting from the first argument.
    fn invalid(i: usize) -> CommandError {
        CommandError::InvalidNumber { index: i as u8 + 1 }
    }

    fn int(&self, i: usize) -> Result<i32, CommandError> {
        self.tokens[i].parse::<i32>().map_err(|_| Self::invalid(i))
    }

    fn float(&self, i: usize) -> Result<f32, CommandError> {
        match self.tokens[i].parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(Self::invalid(i)),
        }
    }

    fn toggle(&self, i: usize) -> Result<bool, CommandError> {
        let t = self.tokens[i];
        if t.eq_ignore_ascii_case("ON") {
            Ok(true)
        } else if t.eq_ignore_ascii_case("OFF") {
            Ok(false)
        } else {
            Err(CommandError::InvalidToggle)
        }
    }

    /// Four wheel speeds, clamped into range.
    fn speeds(&self) -> Result<WheelSpeeds, CommandError> {
        self.expect(WHEEL_COUNT as u8)?;
        let mut raw = [0i32; WHEEL_COUNT];
        for (i, r) in raw.iter_mut().enumerate() {
            *r = self.int(i)?;
        }
        Ok(WheelSpeeds::new(raw))
    }

    fn test(&self) -> Result<Command, CommandError> {
        self.expect(3)?;
        let index = self.int(0)?;
        let wheel = u8::try_from(index)
            .ok()
            .and_then(Wheel::from_index)
            .ok_or(CommandError::InvalidMotor)?;
        let speed = clamp_speed(self.int(1)?);
        let duration_ms = self.tokens[2]
            .parse::<u32>()
            .map_err(|_| Self::invalid(2))?
            .min(TEST_MAX_DURATION_MS);
        Ok(Command::Test {
            wheel,
            speed,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_forms_are_equivalent() {
        let expected = Command::Move(WheelSpeeds::new([100, -100, 50, 0]));
        assert_eq!(Command::parse("MOVE,100,-100,50,0"), Ok(expected));
        assert_eq!(Command::parse("move, 100, -100, 50, 0"), Ok(expected));
        assert_eq!(Command::parse("100,-100,50,0"), Ok(expected));
    }

    #[test]
    fn move_values_are_clamped() {
        assert_eq!(
            Command::parse("300,-999,255,-255"),
            Ok(Command::Move(WheelSpeeds::new([255, -255, 255, -255])))
        );
    }

    #[test]
    fn bad_numbers_are_reported_by_position() {
        assert_eq!(
            Command::parse("abc,1,2,3"),
            Err(CommandError::InvalidNumber { index: 1 })
        );
        assert_eq!(
            Command::parse("MOVE,1,2,x,4"),
            Err(CommandError::InvalidNumber { index: 3 })
        );
        assert_eq!(
            Command::parse("MOVE,1,2,3"),
            Err(CommandError::ArgumentCount {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn toggles_and_heading() {
        assert_eq!(Command::parse("BALANCE,ON"), Ok(Command::Balance(true)));
        assert_eq!(Command::parse("balance,off"), Ok(Command::Balance(false)));
        assert_eq!(
            Command::parse("BALANCE,maybe"),
            Err(CommandError::InvalidToggle)
        );
        assert_eq!(Command::parse("HEADING,-45.5"), Ok(Command::Heading(-45.5)));
        assert_eq!(Command::parse("heading,off"), Ok(Command::HeadingOff));
        assert_eq!(
            Command::parse("HEADING,nan"),
            Err(CommandError::InvalidNumber { index: 1 })
        );
    }

    #[test]
    fn short_keywords() {
        assert_eq!(Command::parse("s"), Ok(Command::Stop));
        assert_eq!(
            Command::parse("F"),
            Ok(Command::LineFollow(LineDirection::Forward))
        );
        assert_eq!(
            Command::parse("backward"),
            Ok(Command::LineFollow(LineDirection::Backward))
        );
        assert_eq!(
            Command::parse("STOP,1"),
            Err(CommandError::ArgumentCount {
                expected: 0,
                got: 1
            })
        );
    }

    #[test]
    fn test_command_is_validated_and_capped() {
        assert_eq!(
            Command::parse("TEST,2,-120,60000"),
            Ok(Command::Test {
                wheel: Wheel::RearLeft,
                speed: -120,
                duration_ms: TEST_MAX_DURATION_MS,
            })
        );
        assert_eq!(
            Command::parse("TEST,4,100,1000"),
            Err(CommandError::InvalidMotor)
        );
        assert_eq!(
            Command::parse("TEST,-1,100,1000"),
            Err(CommandError::InvalidMotor)
        );
        assert_eq!(
            Command::parse("TEST,0,100,-5"),
            Err(CommandError::InvalidNumber { index: 3 })
        );
    }

    #[test]
    fn calibration_duration_bounds() {
        assert_eq!(
            Command::parse("CALIBRATE_IMU,5"),
            Ok(Command::CalibrateImu { seconds: 5 })
        );
        assert_eq!(
            Command::parse("CALIBRATE_IMU,0"),
            Err(CommandError::InvalidDuration)
        );
        assert_eq!(
            Command::parse("CALIBRATE_IMU,31"),
            Err(CommandError::InvalidDuration)
        );
    }

    #[test]
    fn unknown_and_empty() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(Command::parse("JUMP"), Err(CommandError::Unknown));
        assert_eq!(Command::parse("1,2,3"), Err(CommandError::Unknown));
    }

    #[test]
    fn drive_and_queries() {
        assert_eq!(
            Command::parse("DRIVE,100,-20,5"),
            Ok(Command::Drive {
                vx: 100,
                vy: -20,
                omega: 5
            })
        );
        assert_eq!(Command::parse("get_sensors"), Ok(Command::GetSensors));
        assert_eq!(
            Command::parse("GET_IMU_CALIBRATION"),
            Ok(Command::GetImuCalibration)
        );
        assert_eq!(Command::parse("VERBOSE,ON"), Ok(Command::Verbose(true)));
        assert_eq!(Command::parse("REARM"), Ok(Command::Rearm));
        assert_eq!(Command::parse("status"), Ok(Command::Status));
    }
}
