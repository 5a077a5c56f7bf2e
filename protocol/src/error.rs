use alloc::string::String;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Event frame must be a JSON array starting with the event name")]
    InvalidFrame,
    #[error("Unknown event `{0}`")]
    UnknownEvent(String),
    #[error("Malformed `{event}` payload: {source}")]
    MalformedPayload {
        event: &'static str,
        source: serde_json::Error,
    },
    #[error("Unrecognized packet `{0}`")]
    InvalidPacket(String),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, ProtocolError>;
