use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Index;
use serde::{Deserialize, Serialize};

use crate::protocol::FlippedCards;
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    NoChange,
    Changed,
}

impl UpdateOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }

    const fn from_changed(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::NoChange }
    }
}

/// Client-side mirror of the dealt cards. The number of cards is fixed
/// once dealt; only faces and learned symbols change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Deals a board from a `start_game` payload.
    pub fn deal(symbols: &[String], flipped: &FlippedCards) -> Result<Self> {
        let mut board = Self {
            cards: symbols.iter().cloned().map(Card::new).collect(),
        };
        board.apply_update(symbols, flipped)?;
        Ok(board)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: CardIndex) -> Option<&Card> {
        self.cards.get(index.to_slot())
    }

    pub fn validate_index(&self, index: CardIndex) -> Result<CardIndex> {
        if index.to_slot() < self.cards.len() {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex(index))
        }
    }

    pub fn face_up_mask(&self) -> Vec<bool> {
        self.cards.iter().map(Card::is_flipped).collect()
    }

    pub fn matched_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched()).count()
    }

    /// Overwrites the faces from a server payload.
    ///
    /// With a mask, every position ends up exactly as the mask says,
    /// except that matched cards never turn back down. A position list
    /// can only turn cards up. Nothing changes when the payload does not
    /// fit the board.
    pub fn apply_update(&mut self, symbols: &[String], flipped: &FlippedCards) -> Result<UpdateOutcome> {
        self.check_size(symbols.len())?;

        let mut changed = false;
        match flipped {
            FlippedCards::Mask(mask) => {
                self.check_size(mask.len())?;
                for ((card, &face_up), symbol) in self.cards.iter_mut().zip(mask).zip(symbols) {
                    changed |= if face_up {
                        card.reveal(symbol)
                    } else {
                        card.turn_face_down()
                    };
                }
            }
            FlippedCards::Positions(positions) => {
                for &index in positions {
                    self.validate_index(index)?;
                }
                for &index in positions {
                    let slot = index.to_slot();
                    changed |= self.cards[slot].reveal(&symbols[slot]);
                }
            }
        }

        Ok(UpdateOutcome::from_changed(changed))
    }

    pub(crate) fn flip_up(&mut self, index: CardIndex) -> Result<UpdateOutcome> {
        let index = self.validate_index(index)?;
        let changed = self.cards[index.to_slot()].turn_face_up();
        Ok(UpdateOutcome::from_changed(changed))
    }

    pub(crate) fn mark_matched(&mut self, pair: CardPair) -> Result<UpdateOutcome> {
        self.validate_pair(pair)?;
        let mut changed = false;
        for index in pair {
            changed |= self.cards[index.to_slot()].mark_matched();
        }
        Ok(UpdateOutcome::from_changed(changed))
    }

    /// Turns a mismatched pair back down, leaving matched cards alone.
    pub(crate) fn revert(&mut self, pair: CardPair) -> Result<UpdateOutcome> {
        self.validate_pair(pair)?;
        let mut changed = false;
        for index in pair {
            changed |= self.cards[index.to_slot()].turn_face_down();
        }
        Ok(UpdateOutcome::from_changed(changed))
    }

    fn validate_pair(&self, pair: CardPair) -> Result<CardPair> {
        for index in pair {
            self.validate_index(index)?;
        }
        Ok(pair)
    }

    fn check_size(&self, actual: usize) -> Result<()> {
        if actual == self.cards.len() {
            Ok(())
        } else {
            Err(GameError::SizeMismatch {
                expected: self.cards.len(),
                actual,
            })
        }
    }
}

impl Index<CardIndex> for Board {
    type Output = Card;

    fn index(&self, index: CardIndex) -> &Self::Output {
        &self.cards[index.to_slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|&symbol| symbol.into()).collect()
    }

    fn hidden_board(len: usize) -> Board {
        Board::deal(&vec![String::new(); len], &FlippedCards::Mask(vec![false; len])).unwrap()
    }

    #[test]
    fn deal_applies_initial_mask() {
        let board = Board::deal(
            &symbols(&["A", "B", "A", "B"]),
            &FlippedCards::Mask(vec![true, false, false, false]),
        )
        .unwrap();

        assert_eq!(board.len(), 4);
        assert_eq!(board.face_up_mask(), [true, false, false, false]);
        assert_eq!(board[0].visible_symbol(), Some("A"));
        assert_eq!(board[1].visible_symbol(), None);
    }

    #[test]
    fn deal_rejects_mismatched_mask() {
        assert_eq!(
            Board::deal(&symbols(&["A", "B"]), &FlippedCards::Mask(vec![false])),
            Err(GameError::SizeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn mask_update_is_full_overwrite_and_idempotent() {
        let mut board = hidden_board(4);
        board.flip_up(1).unwrap();

        let cards = symbols(&["A", "B", "A", "B"]);
        let mask = FlippedCards::Mask(vec![true, false, true, false]);

        assert!(board.apply_update(&cards, &mask).unwrap().has_update());
        assert_eq!(board.face_up_mask(), [true, false, true, false]);
        let first = board.clone();

        assert_eq!(board.apply_update(&cards, &mask).unwrap(), UpdateOutcome::NoChange);
        assert_eq!(board, first);
        assert_eq!(board[2].visible_symbol(), Some("A"));
    }

    #[test]
    fn mask_update_keeps_matched_cards_up() {
        let mut board = hidden_board(4);
        board.mark_matched([0, 2]).unwrap();

        board
            .apply_update(&symbols(&["A", "B", "A", "B"]), &FlippedCards::Mask(vec![false; 4]))
            .unwrap();

        assert_eq!(board.face_up_mask(), [true, false, true, false]);
        assert_eq!(board.matched_count(), 2);
    }

    #[test]
    fn position_update_only_raises() {
        let mut board = hidden_board(4);
        board.flip_up(0).unwrap();

        board
            .apply_update(&symbols(&["A", "B", "A", "B"]), &FlippedCards::Positions(vec![3]))
            .unwrap();

        assert_eq!(board.face_up_mask(), [true, false, false, true]);
        assert_eq!(board[3].visible_symbol(), Some("B"));
    }

    #[test]
    fn invalid_update_leaves_board_untouched() {
        let mut board = hidden_board(4);
        let before = board.clone();

        assert_eq!(
            board.apply_update(&symbols(&["A", "B", "A", "B"]), &FlippedCards::Positions(vec![0, 9])),
            Err(GameError::InvalidIndex(9))
        );
        assert_eq!(
            board.apply_update(&symbols(&["A"]), &FlippedCards::Positions(vec![0])),
            Err(GameError::SizeMismatch {
                expected: 4,
                actual: 1
            })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn revert_skips_matched_cards() {
        let mut board = hidden_board(4);
        board.flip_up(0).unwrap();
        board.flip_up(1).unwrap();
        board.mark_matched([1, 3]).unwrap();

        assert!(board.revert([0, 1]).unwrap().has_update());
        assert_eq!(board.face_up_mask(), [false, true, false, true]);
    }
}
