#![no_std]

extern crate alloc;

use chrono::TimeDelta;

pub use board::*;
pub use card::*;
pub use controller::*;
pub use error::*;
pub use flip::*;
pub use schedule::*;
pub use session::*;
pub use timer::*;
pub use types::*;

pub use concentration_protocol as protocol;

mod board;
mod card;
mod controller;
mod error;
mod flip;
mod schedule;
mod session;
mod timer;
mod types;

/// Pause between the second flip and the match-check request, so the
/// second card is visible before the server answers.
pub const CHECK_DELAY_MS: i64 = 700;

/// How long a mismatched pair stays face-up before turning back.
pub const REVERT_DELAY_MS: i64 = 800;

/// Pause between `game_over` and the final alert and reload.
pub const GAME_OVER_DELAY_MS: i64 = 500;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub check_delay: TimeDelta,
    pub revert_delay: TimeDelta,
    pub game_over_delay: TimeDelta,
    /// Releases a match-check lock that never got an answer. Off by
    /// default: without it a lost `match_result` keeps the board locked.
    pub lock_timeout: Option<TimeDelta>,
}

impl ClientConfig {
    pub fn with_lock_timeout(self, lock_timeout: Option<TimeDelta>) -> Self {
        Self {
            lock_timeout,
            ..self
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            check_delay: TimeDelta::milliseconds(CHECK_DELAY_MS),
            revert_delay: TimeDelta::milliseconds(REVERT_DELAY_MS),
            game_over_delay: TimeDelta::milliseconds(GAME_OVER_DELAY_MS),
            lock_timeout: None,
        }
    }
}
