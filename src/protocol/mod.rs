// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Serial Command Protocol
//!
//! Line-oriented ASCII protocol between the operator (dashboard, terminal script) and the robot.
//!
//! - [`parser`] - Byte-at-a-time framing into a fixed buffer.
//! - [`messages`] - Command decoding and validation.
//! - [`status`] - Acknowledgements, errors, events and telemetry lines.

pub mod messages;
pub mod parser;
pub mod status;

pub use messages::Command;
pub use parser::Parser;
pub use status::{ErrorLine, Event, Reply, StatusSnapshot, Telemetry};
