use thiserror::Error;

use crate::CardIndex;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Card index {0} is outside the board")]
    InvalidIndex(CardIndex),
    #[error("Expected {expected} cards but the payload describes {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("No board has been dealt yet")]
    NotDealt,
}

pub type Result<T> = core::result::Result<T, GameError>;
