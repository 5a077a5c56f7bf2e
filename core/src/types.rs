use chrono::{DateTime, Utc};

pub use concentration_protocol::CardIndex;

/// Wall-clock instant supplied by the host on every call.
pub type Timestamp = DateTime<Utc>;

/// The two positions of a match check, in pick order.
pub type CardPair = [CardIndex; 2];

pub trait ToSlot {
    fn to_slot(self) -> usize;
}

impl ToSlot for CardIndex {
    fn to_slot(self) -> usize {
        self.into()
    }
}
