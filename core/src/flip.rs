use serde::{Deserialize, Serialize};

use crate::*;

/// Where the local player is in picking a pair.
///
/// `AwaitingResult` and `Reverting` hold the lock: no card can be picked
/// until the server has adjudicated the pair and, for a mismatch, the
/// pair has been turned back down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipState {
    #[default]
    Idle,
    OneSelected {
        first: CardIndex,
    },
    AwaitingResult {
        pair: CardPair,
    },
    Reverting {
        pair: CardPair,
    },
}

/// Why a click did nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    NotDealt,
    NotMyTurn,
    Locked,
    OutOfRange,
    AlreadyFlipped,
    AlreadyMatched,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Rejected(Rejection),
    FirstPicked(CardIndex),
    PairPicked(CardPair),
}

impl ClickOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

impl FlipState {
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::AwaitingResult { .. } | Self::Reverting { .. })
    }

    pub const fn first_card(self) -> Option<CardIndex> {
        match self {
            Self::OneSelected { first } => Some(first),
            _ => None,
        }
    }

    pub const fn pending_pair(self) -> Option<CardPair> {
        match self {
            Self::AwaitingResult { pair } | Self::Reverting { pair } => Some(pair),
            _ => None,
        }
    }

    /// Checks whether a click on `index` would be accepted.
    pub fn check_eligible(
        self,
        board: &Board,
        my_turn: bool,
        index: CardIndex,
    ) -> core::result::Result<(), Rejection> {
        if !my_turn {
            return Err(Rejection::NotMyTurn);
        }
        if self.is_locked() {
            return Err(Rejection::Locked);
        }
        if self.first_card() == Some(index) {
            return Err(Rejection::AlreadyFlipped);
        }
        match board.card(index).map(Card::face) {
            None => Err(Rejection::OutOfRange),
            Some(CardFace::Matched) => Err(Rejection::AlreadyMatched),
            Some(CardFace::FaceUp) => Err(Rejection::AlreadyFlipped),
            Some(CardFace::FaceDown) => Ok(()),
        }
    }

    /// Applies a click: turns the card up optimistically and advances the
    /// state. A second pick locks and forgets the first card right away.
    pub fn pick(&mut self, board: &mut Board, my_turn: bool, index: CardIndex) -> ClickOutcome {
        if let Err(rejection) = self.check_eligible(board, my_turn, index) {
            return ClickOutcome::Rejected(rejection);
        }
        if board.flip_up(index).is_err() {
            return ClickOutcome::Rejected(Rejection::OutOfRange);
        }

        match *self {
            Self::OneSelected { first } => {
                let pair = [first, index];
                *self = Self::AwaitingResult { pair };
                ClickOutcome::PairPicked(pair)
            }
            _ => {
                *self = Self::OneSelected { first: index };
                ClickOutcome::FirstPicked(index)
            }
        }
    }

    /// Forgets a first pick that the board no longer shows face-up.
    pub fn forget_lowered(&mut self, board: &Board) -> bool {
        match *self {
            Self::OneSelected { first } if !board.card(first).is_some_and(Card::is_flipped) => {
                *self = Self::Idle;
                true
            }
            _ => false,
        }
    }

    /// Applies an adjudication. Returns whether it released (or began
    /// releasing) this client's lock.
    pub fn resolve(&mut self, indices: CardPair, is_match: bool) -> bool {
        match *self {
            Self::AwaitingResult { .. } => {
                *self = if is_match {
                    Self::Idle
                } else {
                    Self::Reverting { pair: indices }
                };
                true
            }
            _ => false,
        }
    }

    /// Finishes a mismatch once its pair has been turned down.
    pub fn finish_revert(&mut self, pair: CardPair) -> bool {
        match *self {
            Self::Reverting { pair: pending } if pending == pair => {
                *self = Self::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drops a lock whose match check never got an answer.
    pub fn release_stuck(&mut self, pair: CardPair) -> bool {
        match *self {
            Self::AwaitingResult { pair: pending } if pending == pair => {
                *self = Self::Idle;
                true
            }
            _ => false,
        }
    }
}
