// Improvement potential: Consider a binary format. JSON is kept for now because browser clients
//   speak it natively.

use serde_json::Value;

use crate::error::ProtocolError;
use crate::event::{GameEvent, GameEventType};


pub const PORT: u16 = 3000;

pub fn serialize_event(event: &GameEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

// Decodes a wire message. Errors distinguish between garbage, unknown message kinds (e.g. sent by
// a newer client) and known kinds with a broken payload, so that the logs tell which one it was.
pub fn parse_event(s: &str) -> Result<GameEvent, ProtocolError> {
    let value: Value =
        serde_json::from_str(s).map_err(|err| ProtocolError::NotJson(err.to_string()))?;
    let type_name = match value.get("type") {
        Some(Value::String(type_name)) => type_name.clone(),
        _ => return Err(ProtocolError::MissingType),
    };
    if type_name.parse::<GameEventType>().is_err() {
        return Err(ProtocolError::UnknownType(type_name));
    }
    serde_json::from_value(value).map_err(|err| ProtocolError::MalformedPayload {
        type_name,
        message: err.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::board::FinishedReason;
    use crate::event::Placement;
    use crate::game::InterruptedReason;
    use crate::mark::Mark;

    #[test]
    fn wire_format() {
        let placement = GameEvent::Placement(Placement { mark: Mark::X, square: 4 });
        assert_eq!(
            serialize_event(&placement).unwrap(),
            r#"{"type":"placement","mark":"x","square":4}"#
        );
        assert_eq!(
            serialize_event(&GameEvent::RegisterConnection).unwrap(),
            r#"{"type":"register-connection"}"#
        );
        assert_eq!(
            serialize_event(&GameEvent::GameFinished { reason: FinishedReason::Tie }).unwrap(),
            r#"{"type":"game-finished","reason":"tie"}"#
        );
        assert_eq!(
            serialize_event(&GameEvent::GameInterrupted {
                reason: InterruptedReason::OResigned
            })
            .unwrap(),
            r#"{"type":"game-interrupted","reason":"resigned-by-o"}"#
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        assert_eq!(
            parse_event(r#"{"type":"placement","square":2,"mark":"o","sentAt":12345}"#),
            Ok(GameEvent::Placement(Placement { mark: Mark::O, square: 2 }))
        );
        assert_eq!(
            parse_event(r#"{"type":"game-started","gameId":"abc"}"#),
            Ok(GameEvent::GameStarted)
        );
        assert_eq!(
            parse_event(r#"{"version":2,"type":"game-interrupted","reason":"aborted"}"#),
            Ok(GameEvent::GameInterrupted { reason: InterruptedReason::Aborted })
        );
    }

    #[test]
    fn bad_messages() {
        assert!(matches!(parse_event("{not json"), Err(ProtocolError::NotJson(_))));
        assert_eq!(parse_event(r#"{"mark":"x"}"#), Err(ProtocolError::MissingType));
        assert_eq!(parse_event(r#"{"type":7}"#), Err(ProtocolError::MissingType));
        assert_eq!(
            parse_event(r#"{"type":"board"}"#),
            Err(ProtocolError::UnknownType("board".to_owned()))
        );
        assert!(matches!(
            parse_event(r#"{"type":"placement","mark":"z","square":1}"#),
            Err(ProtocolError::MalformedPayload { .. })
        ));
        assert!(matches!(
            parse_event(r#"{"type":"game-finished"}"#),
            Err(ProtocolError::MalformedPayload { .. })
        ));
    }
}
