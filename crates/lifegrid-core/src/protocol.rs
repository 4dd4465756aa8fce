//! JSON wire protocol shared by every connected client.
//!
//! Every message in either direction is an [`Envelope`]:
//!
//! ```json
//! {"type": "toggle", "data": {"x": 3, "y": 7}}
//! ```
//!
//! # Inbound
//!
//! | `type` | `data` |
//! |--------|--------|
//! | `toggle` | `{"x": int, "y": int}` |
//! | `start` | none |
//! | `stop` | none |
//! | `clear` | none |
//! | `random` | none |
//! | `save` | `{"name": string}` |
//! | `load` | `{"name": string}` |
//!
//! `data` may be omitted or `null` for commands without a payload.
//!
//! # Outbound
//!
//! | `type` | `data` |
//! |--------|--------|
//! | `grid` | row-major nested array of `0`/`1` |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Discriminator of the outbound grid snapshot message.
pub const GRID_MESSAGE: &str = "grid";

/// A tagged message with an optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Message discriminator.
    #[serde(rename = "type")]
    pub kind: String,

    /// Payload, present only when the message type needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<'a> Envelope<&'a Grid> {
    /// Wrap a grid in an outbound `grid` envelope.
    pub fn grid(grid: &'a Grid) -> Self {
        Self {
            kind: GRID_MESSAGE.to_owned(),
            data: Some(grid),
        }
    }
}

/// Serialize `grid` into the JSON text of a `grid` envelope.
pub fn encode_grid(grid: &Grid) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope::grid(grid))
}

/// Errors raised while decoding an inbound message.
///
/// Any of these causes the whole message to be dropped.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The text is not a JSON envelope.
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The `type` field names no known command.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// A command that requires a payload arrived without one.
    #[error("missing payload for {0}")]
    MissingPayload(&'static str),

    /// The payload does not have the shape the command requires.
    #[error("invalid payload for {kind}: {source}")]
    Payload {
        /// The command whose payload failed to decode.
        kind: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// A client command, decoded from an inbound [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Flip the cell at column `x`, row `y`.
    Toggle {
        /// Column, 0-based.
        x: i64,
        /// Row, 0-based.
        y: i64,
    },
    /// Let the ticker advance the grid.
    Start,
    /// Stop the ticker from advancing the grid.
    Stop,
    /// Kill every cell.
    Clear,
    /// Re-roll every cell at the configured density.
    Randomize,
    /// Store a copy of the current grid under a name.
    Save {
        /// Pattern name.
        name: String,
    },
    /// Replace the current grid with a stored pattern.
    Load {
        /// Pattern name.
        name: String,
    },
}

#[derive(Deserialize)]
struct TogglePayload {
    x: i64,
    y: i64,
}

#[derive(Deserialize)]
struct NamePayload {
    name: String,
}

impl Command {
    /// Decode a command from the JSON text of an inbound envelope.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(text).map_err(DecodeError::Envelope)?;
        Self::from_envelope(envelope)
    }

    /// Decode a command from an already-parsed envelope.
    pub fn from_envelope(envelope: Envelope<serde_json::Value>) -> Result<Self, DecodeError> {
        let data = envelope.data;
        match envelope.kind.as_str() {
            "toggle" => {
                let TogglePayload { x, y } = payload("toggle", data)?;
                Ok(Self::Toggle { x, y })
            }
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "clear" => Ok(Self::Clear),
            "random" => Ok(Self::Randomize),
            "save" => {
                let NamePayload { name } = payload("save", data)?;
                Ok(Self::Save { name })
            }
            "load" => {
                let NamePayload { name } = payload("load", data)?;
                Ok(Self::Load { name })
            }
            _ => Err(DecodeError::UnknownType(envelope.kind)),
        }
    }

    /// The wire name of this command.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Toggle { .. } => "toggle",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Clear => "clear",
            Self::Randomize => "random",
            Self::Save { .. } => "save",
            Self::Load { .. } => "load",
        }
    }
}

fn payload<T: DeserializeOwned>(
    kind: &'static str,
    data: Option<serde_json::Value>,
) -> Result<T, DecodeError> {
    let value = data.ok_or(DecodeError::MissingPayload(kind))?;
    serde_json::from_value(value).map_err(|source| DecodeError::Payload { kind, source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode_ok(text: &str) -> Command {
        Command::decode(text).unwrap()
    }

    #[test]
    fn decodes_every_command() {
        assert_eq!(
            decode_ok(r#"{"type":"toggle","data":{"x":3,"y":7}}"#),
            Command::Toggle { x: 3, y: 7 }
        );
        assert_eq!(decode_ok(r#"{"type":"start"}"#), Command::Start);
        assert_eq!(decode_ok(r#"{"type":"stop","data":null}"#), Command::Stop);
        assert_eq!(decode_ok(r#"{"type":"clear"}"#), Command::Clear);
        assert_eq!(decode_ok(r#"{"type":"random","data":null}"#), Command::Randomize);
        assert_eq!(
            decode_ok(r#"{"type":"save","data":{"name":"glider"}}"#),
            Command::Save {
                name: String::from("glider")
            }
        );
        assert_eq!(
            decode_ok(r#"{"type":"load","data":{"name":"glider"}}"#),
            Command::Load {
                name: String::from("glider")
            }
        );
    }

    #[test]
    fn negative_coordinates_still_decode() {
        assert_eq!(
            decode_ok(r#"{"type":"toggle","data":{"x":-1,"y":0}}"#),
            Command::Toggle { x: -1, y: 0 }
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            Command::decode("not json"),
            Err(DecodeError::Envelope(_))
        ));
        assert!(matches!(
            Command::decode(r#"{"data":{}}"#),
            Err(DecodeError::Envelope(_))
        ));
        assert!(matches!(
            Command::decode(r#"{"type":"explode"}"#),
            Err(DecodeError::UnknownType(kind)) if kind == "explode"
        ));
        assert!(matches!(
            Command::decode(r#"{"type":"toggle"}"#),
            Err(DecodeError::MissingPayload("toggle"))
        ));
        assert!(matches!(
            Command::decode(r#"{"type":"toggle","data":{"x":"a","y":1}}"#),
            Err(DecodeError::Payload { kind: "toggle", .. })
        ));
        assert!(matches!(
            Command::decode(r#"{"type":"save","data":{}}"#),
            Err(DecodeError::Payload { kind: "save", .. })
        ));
    }

    #[test]
    fn kind_matches_wire_name() {
        for text in [
            r#"{"type":"start"}"#,
            r#"{"type":"random"}"#,
            r#"{"type":"load","data":{"name":"x"}}"#,
        ] {
            let command = decode_ok(text);
            let value: serde_json::Value = serde_json::from_str(text).unwrap();
            assert_eq!(value["type"], command.kind());
        }
    }

    #[test]
    fn encodes_grid_envelope() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 1, true);
        let text = encode_grid(&grid).unwrap();
        assert_eq!(text, r#"{"type":"grid","data":[[0,0],[1,0]]}"#);
    }
}
