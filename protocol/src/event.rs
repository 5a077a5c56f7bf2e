use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPost {
    pub room_code: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipNotice {
    pub index: CardIndex,
    pub room_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCheck {
    pub indices: [CardIndex; 2],
    pub room_code: String,
}

/// Events the client emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    CreateGame(String),
    JoinGame(JoinRequest),
    /// Carries the room code.
    StartGame(String),
    ChatMessage(ChatPost),
    FlipCard(FlipNotice),
    CheckMatch(MatchCheck),
}

impl ClientEvent {
    pub const fn name(&self) -> &'static str {
        use ClientEvent::*;
        match self {
            CreateGame(_) => "create_game",
            JoinGame(_) => "join_game",
            StartGame(_) => "start_game",
            ChatMessage(_) => "chat_message",
            FlipCard(_) => "flip_card",
            CheckMatch(_) => "check_match",
        }
    }

    /// Builds the `[name, payload]` array carried by an `EVENT` packet.
    pub fn to_value(&self) -> Result<Value> {
        use ClientEvent::*;
        let payload = match self {
            CreateGame(username) => Value::from(username.as_str()),
            JoinGame(request) => serde_json::to_value(request)?,
            StartGame(room_code) => Value::from(room_code.as_str()),
            ChatMessage(post) => serde_json::to_value(post)?,
            FlipCard(notice) => serde_json::to_value(notice)?,
            CheckMatch(check) => serde_json::to_value(check)?,
        };
        Ok(Value::Array(vec![Value::from(self.name()), payload]))
    }
}

/// Face-up state as sent by the server.
///
/// The documented form is a boolean mask parallel to the cards, but the
/// reference server reports single flips as a list of positions
/// (`"flipped": [3]`). Both are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlippedCards {
    Mask(Vec<bool>),
    Positions(Vec<CardIndex>),
}

impl Default for FlippedCards {
    fn default() -> Self {
        Self::Mask(Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCreated {
    pub code: String,
    #[serde(default)]
    pub is_creator: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerJoined {
    pub players: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLeft {
    #[serde(default)]
    pub username: String,
    pub players: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    pub cards: Vec<String>,
    pub flipped: FlippedCards,
    pub scores: Scoreboard,
    pub turn: String,
    #[serde(default)]
    pub players: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardUpdate {
    pub cards: Vec<String>,
    pub flipped: FlippedCards,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub indices: [CardIndex; 2],
    pub scores: Scoreboard,
    pub turn: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    pub username: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub winner: String,
    pub scores: Scoreboard,
}

/// Rejection the server sends back for a join or start request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNotice {
    pub message: String,
}

/// Events the server pushes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    RoomCreated(RoomCreated),
    PlayerJoined(PlayerJoined),
    PlayerLeft(PlayerLeft),
    StartGame(GameStarted),
    UpdateBoard(BoardUpdate),
    MatchResult(MatchResult),
    ChatMessage(ChatLine),
    TurnUpdate(String),
    TimerReset,
    GameOver(GameOver),
    JoinError(ServerNotice),
    StartError(ServerNotice),
}

impl ServerEvent {
    pub const fn name(&self) -> &'static str {
        use ServerEvent::*;
        match self {
            RoomCreated(_) => "room_created",
            PlayerJoined(_) => "player_joined",
            PlayerLeft(_) => "player_left",
            StartGame(_) => "start_game",
            UpdateBoard(_) => "update_board",
            MatchResult(_) => "match_result",
            ChatMessage(_) => "chat_message",
            TurnUpdate(_) => "turn_update",
            TimerReset => "timer_reset",
            GameOver(_) => "game_over",
            JoinError(_) => "join_error",
            StartError(_) => "start_error",
        }
    }

    /// Decodes a `[name, payload?]` array.
    pub fn from_value(frame: Value) -> Result<Self> {
        let Value::Array(items) = frame else {
            return Err(ProtocolError::InvalidFrame);
        };
        let mut items = items.into_iter();
        let Some(Value::String(name)) = items.next() else {
            return Err(ProtocolError::InvalidFrame);
        };
        let payload = items.next().unwrap_or(Value::Null);
        Self::decode(&name, payload)
    }

    pub fn from_json(frame: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(frame)?)
    }

    fn decode(name: &str, payload: Value) -> Result<Self> {
        use ServerEvent::*;
        Ok(match name {
            "room_created" => RoomCreated(parse_payload("room_created", payload)?),
            "player_joined" => PlayerJoined(parse_payload("player_joined", payload)?),
            "player_left" => PlayerLeft(parse_payload("player_left", payload)?),
            "start_game" => StartGame(parse_payload("start_game", payload)?),
            "update_board" => UpdateBoard(parse_payload("update_board", payload)?),
            "match_result" => MatchResult(parse_payload("match_result", payload)?),
            "chat_message" => ChatMessage(parse_payload("chat_message", payload)?),
            "turn_update" => TurnUpdate(parse_payload("turn_update", payload)?),
            "timer_reset" => TimerReset,
            "game_over" => GameOver(parse_payload("game_over", payload)?),
            "join_error" => JoinError(parse_payload("join_error", payload)?),
            "start_error" => StartError(parse_payload("start_error", payload)?),
            _ => return Err(ProtocolError::UnknownEvent(name.to_string())),
        })
    }
}

fn parse_payload<T: DeserializeOwned>(event: &'static str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|source| ProtocolError::MalformedPayload { event, source })
}
