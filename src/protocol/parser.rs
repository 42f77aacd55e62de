// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line framing for the command protocol.
//!
//! Bytes are fed one at a time as they arrive; a partial line survives across cycles in a
//! fixed-capacity buffer. `\n` or `\r` completes a line, so `\r\n` endings are accepted and the empty
//! line between the two characters is skipped.

use heapless::Vec;

use crate::config::COMMAND_BUFFER_LEN;
use crate::error::CommandError;
use crate::protocol::messages::Command;

enum State {
    Accumulating,
    /// The current line overflowed; drop bytes until its terminator.
    Discarding,
}

pub struct Parser {
    state: State,
    buf: Vec<u8, COMMAND_BUFFER_LEN>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Accumulating,
            buf: Vec::new(),
        }
    }

    /// Process a single incoming byte. Returns `Some` once a complete line has been decoded, or
    /// when the line in progress has just overflowed the buffer.
    pub fn push(&mut self, byte: u8) -> Option<Result<Command, CommandError>> {
        let terminator = byte == b'\n' || byte == b'\r';

        match self.state {
            State::Discarding => {
                if terminator {
                    self.state = State::Accumulating;
                }
                None
            }
            State::Accumulating if terminator => {
                if self.buf.is_empty() {
                    return None;
                }
                let result = self.decode();
                self.buf.clear();
                Some(result)
            }
            State::Accumulating => {
                if self.buf.push(byte).is_err() {
                    self.buf.clear();
                    self.state = State::Discarding;
                    return Some(Err(CommandError::Overflow));
                }
                None
            }
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.buf.len()
    }

    fn decode(&self) -> Result<Command, CommandError> {
        if !self.buf.is_ascii() {
            return Err(CommandError::Encoding);
        }
        let line = core::str::from_utf8(&self.buf).map_err(|_| CommandError::Encoding)?;
        Command::parse(line)
    }
}
