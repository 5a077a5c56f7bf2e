//! Wire contract between the concentration client and its room server.
//!
//! Events travel as JSON arrays (`["name", payload]`) inside Socket.IO
//! `EVENT` packets, which themselves ride Engine.IO text frames on a
//! WebSocket. [`ClientEvent`] and [`ServerEvent`] are the typed views of
//! those arrays and [`Packet`] is the framing around them.

#![no_std]

extern crate alloc;

pub use error::*;
pub use event::*;
pub use packet::*;
pub use scoreboard::*;

mod error;
mod event;
mod packet;
mod scoreboard;

/// Position of a card on the board, in deal order.
pub type CardIndex = u16;
