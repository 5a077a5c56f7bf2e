//! Engine.IO v4 / Socket.IO v5 text framing, default namespace only.
//!
//! Only what a browser client on the WebSocket transport needs: the
//! handshake, heartbeats, namespace connect and plain events. Binary
//! attachments and acknowledgements are not used by this game.

use alloc::format;
use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::*;

/// Path and query that select the Engine.IO WebSocket transport.
pub const ENGINE_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Payload of the Engine.IO `OPEN` packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u32,
    #[serde(default)]
    pub ping_timeout: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    /// The `[name, payload?]` array of an event.
    Event(Value),
    ConnectError(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

impl Packet {
    /// Namespace connect request sent once the transport is open.
    pub const fn connect() -> Self {
        Self::Message(SocketPacket::Connect(None))
    }

    pub fn event(event: &ClientEvent) -> Result<Self> {
        Ok(Self::Message(SocketPacket::Event(event.to_value()?)))
    }

    pub fn decode(frame: &str) -> Result<Self> {
        let invalid = || ProtocolError::InvalidPacket(frame.to_string());
        let mut chars = frame.chars();
        let kind = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();

        Ok(match kind {
            '0' => Self::Open(serde_json::from_str(rest)?),
            '1' => Self::Close,
            '2' => Self::Ping,
            '3' => Self::Pong,
            '4' => Self::Message(decode_socket_packet(rest).ok_or_else(invalid)??),
            '5' => Self::Upgrade,
            '6' => Self::Noop,
            _ => return Err(invalid()),
        })
    }

    pub fn encode(&self) -> Result<String> {
        use SocketPacket::*;
        Ok(match self {
            Self::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            Self::Close => "1".to_string(),
            Self::Ping => "2".to_string(),
            Self::Pong => "3".to_string(),
            Self::Message(Connect(None)) => "40".to_string(),
            Self::Message(Connect(Some(auth))) => format!("40{}", auth),
            Self::Message(Disconnect) => "41".to_string(),
            Self::Message(Event(array)) => format!("42{}", array),
            Self::Message(ConnectError(data)) => format!("44{}", data),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        })
    }
}

/// Returns `None` when the socket packet type is not understood.
fn decode_socket_packet(body: &str) -> Option<Result<SocketPacket>> {
    let mut chars = body.chars();
    let kind = chars.next()?;
    let rest = skip_namespace(chars.as_str());

    let json = |data: &str| -> Result<Option<Value>> {
        if data.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_str(data)?))
        }
    };

    Some(match kind {
        '0' => json(rest).map(SocketPacket::Connect),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            json(rest).map(|array| SocketPacket::Event(array.unwrap_or(Value::Null)))
        }
        '4' => json(rest).map(|data| SocketPacket::ConnectError(data.unwrap_or(Value::Null))),
        _ => return None,
    })
}

/// Drops a leading `/namespace,` if present.
fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_handshake() {
        let packet =
            Packet::decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#)
                .unwrap();

        assert_eq!(
            packet,
            Packet::Open(Handshake {
                sid: "abc".into(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn decodes_heartbeat_and_connect_ack() {
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping);
        assert_eq!(Packet::encode(&Packet::Pong).unwrap(), "3");
        assert_eq!(
            Packet::decode(r#"40{"sid":"xyz"}"#).unwrap(),
            Packet::Message(SocketPacket::Connect(Some(json!({"sid": "xyz"}))))
        );
        assert_eq!(Packet::connect().encode().unwrap(), "40");
    }

    #[test]
    fn event_packet_carries_event_array() {
        let packet = Packet::decode(r#"42["turn_update","p2"]"#).unwrap();
        let Packet::Message(SocketPacket::Event(array)) = packet else {
            panic!("unexpected packet: {:?}", packet);
        };

        assert_eq!(
            ServerEvent::from_value(array).unwrap(),
            ServerEvent::TurnUpdate("p2".into())
        );
    }

    #[test]
    fn event_packet_skips_namespace_and_ack_id() {
        assert_eq!(
            Packet::decode(r#"42/game,7["timer_reset"]"#).unwrap(),
            Packet::Message(SocketPacket::Event(json!(["timer_reset"])))
        );
    }

    #[test]
    fn encodes_client_event() {
        let event = ClientEvent::FlipCard(FlipNotice {
            index: 3,
            room_code: "ABCD".into(),
        });

        assert_eq!(
            Packet::event(&event).unwrap().encode().unwrap(),
            r#"42["flip_card",{"index":3,"room_code":"ABCD"}]"#
        );
    }

    #[test]
    fn rejects_unknown_packets() {
        assert!(matches!(Packet::decode(""), Err(ProtocolError::InvalidPacket(_))));
        assert!(matches!(Packet::decode("9"), Err(ProtocolError::InvalidPacket(_))));
        assert!(matches!(Packet::decode("47"), Err(ProtocolError::InvalidPacket(_))));
    }
}
