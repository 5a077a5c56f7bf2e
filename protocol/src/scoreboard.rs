use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Match counts per player, kept in the order the server listed them.
///
/// The server builds its score object in join order, so the key order of
/// the JSON object is meaningful for display. A plain map type would sort
/// or hash it away.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    entries: Vec<(String, u32)>,
}

impl Scoreboard {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, player: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(name, _)| name == player)
            .map(|&(_, score)| score)
    }

    /// Sets `player`'s score, keeping its position if already present.
    pub fn set(&mut self, player: impl Into<String>, score: u32) {
        let player = player.into();
        match self.entries.iter_mut().find(|(name, _)| *name == player) {
            Some((_, slot)) => *slot = score,
            None => self.entries.push((player, score)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .map(|(name, score)| (name.as_str(), *score))
    }
}

impl FromIterator<(String, u32)> for Scoreboard {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut scoreboard = Self::new();
        for (player, score) in iter {
            scoreboard.set(player, score);
        }
        scoreboard
    }
}

/// One `name: score` line per player.
impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (player, score)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {}", player, score)?;
        }
        Ok(())
    }
}

impl Serialize for Scoreboard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (player, score) in &self.entries {
            map.serialize_entry(player, score)?;
        }
        map.end()
    }
}

struct ScoreboardVisitor;

impl<'de> Visitor<'de> for ScoreboardVisitor {
    type Value = Scoreboard;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping player names to scores")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut scoreboard = Scoreboard::new();
        while let Some((player, score)) = access.next_entry::<String, u32>()? {
            scoreboard.set(player, score);
        }
        Ok(scoreboard)
    }
}

impl<'de> Deserialize<'de> for Scoreboard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ScoreboardVisitor)
    }
}
