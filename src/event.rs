use serde::{Deserialize, Serialize};
use strum::{EnumDiscriminants, EnumIter, EnumString, IntoStaticStr};

use crate::board::{FinishedReason, Square};
use crate::game::InterruptedReason;
use crate::mark::Mark;


#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Placement {
    pub mark: Mark,
    pub square: Square,
}

// Everything that travels over the websocket, in both directions. Serialized as a JSON object
// with a `type` tag, e.g. `{"type": "placement", "mark": "x", "square": 4}`. Unknown fields are
// ignored so that older servers can talk to newer clients.
//
// Direction:
//   - `RegisterConnection`: client -> server;
//   - `Placement`, `GameInterrupted`: both ways;
//   - `GameStarted`, `GameFinished`: server -> client.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[strum_discriminants(name(GameEventType), derive(EnumIter, EnumString, IntoStaticStr))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum GameEvent {
    RegisterConnection,
    Placement(Placement),
    GameStarted,
    GameFinished { reason: FinishedReason },
    GameInterrupted { reason: InterruptedReason },
}

impl GameEvent {
    pub fn event_type(&self) -> GameEventType { self.into() }
    pub fn type_name(&self) -> &'static str { self.event_type().into() }
}


#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::board::FinishedReason;
    use crate::game::InterruptedReason;
    use crate::mark::Mark;

    // The `type` tag written by serde and the discriminant names must agree.
    #[test]
    fn type_names_match_wire_tags() {
        let events = [
            GameEvent::RegisterConnection,
            GameEvent::Placement(Placement { mark: Mark::X, square: 4 }),
            GameEvent::GameStarted,
            GameEvent::GameFinished { reason: FinishedReason::Tie },
            GameEvent::GameInterrupted { reason: InterruptedReason::Aborted },
        ];
        assert_eq!(events.len(), GameEventType::iter().count());
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.type_name());
            assert_eq!(event.type_name().parse::<GameEventType>(), Ok(event.event_type()));
        }
        assert!("placements".parse::<GameEventType>().is_err());
    }
}
