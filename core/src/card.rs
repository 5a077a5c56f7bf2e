use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Visible state of a single card. `Matched` is face-up for good.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

impl CardFace {
    pub const fn is_flipped(self) -> bool {
        matches!(self, Self::FaceUp | Self::Matched)
    }

    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Matched)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    symbol: String,
    face: CardFace,
}

impl Card {
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            face: CardFace::FaceDown,
        }
    }

    /// Last symbol learned for this position; empty while the server
    /// keeps it hidden.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn face(&self) -> CardFace {
        self.face
    }

    pub fn is_flipped(&self) -> bool {
        self.face.is_flipped()
    }

    pub fn is_matched(&self) -> bool {
        self.face.is_matched()
    }

    /// Symbol to draw, only while face-up.
    pub fn visible_symbol(&self) -> Option<&str> {
        (self.is_flipped() && !self.symbol.is_empty()).then_some(self.symbol.as_str())
    }

    pub(crate) fn turn_face_up(&mut self) -> bool {
        match self.face {
            CardFace::FaceDown => {
                self.face = CardFace::FaceUp;
                true
            }
            CardFace::FaceUp | CardFace::Matched => false,
        }
    }

    /// Turns face-up and records `symbol`. An empty placeholder never
    /// erases a symbol that is already known.
    pub(crate) fn reveal(&mut self, symbol: &str) -> bool {
        let mut changed = self.turn_face_up();
        if !symbol.is_empty() && self.symbol != symbol {
            self.symbol = symbol.into();
            changed = true;
        }
        changed
    }

    pub(crate) fn mark_matched(&mut self) -> bool {
        let changed = !self.is_matched();
        self.face = CardFace::Matched;
        changed
    }

    /// Matched cards stay face-up.
    pub(crate) fn turn_face_down(&mut self) -> bool {
        match self.face {
            CardFace::FaceUp => {
                self.face = CardFace::FaceDown;
                true
            }
            CardFace::FaceDown | CardFace::Matched => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_card_cannot_be_turned_down() {
        let mut card = Card::new("A".into());

        assert!(card.turn_face_up());
        assert!(card.mark_matched());
        assert!(!card.turn_face_down());
        assert_eq!(card.face(), CardFace::Matched);
        assert!(card.is_flipped());
    }

    #[test]
    fn placeholder_symbol_keeps_known_symbol() {
        let mut card = Card::new(String::new());
        assert_eq!(card.visible_symbol(), None);

        assert!(card.reveal("A"));
        assert_eq!(card.visible_symbol(), Some("A"));

        assert!(!card.reveal(""));
        assert_eq!(card.symbol(), "A");
    }

    #[test]
    fn face_down_card_hides_symbol() {
        let mut card = Card::new("B".into());
        assert_eq!(card.visible_symbol(), None);

        card.turn_face_up();
        assert_eq!(card.visible_symbol(), Some("B"));
    }
}
