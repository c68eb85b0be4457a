#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod board;
pub mod clients;
pub mod error;
pub mod event;
pub mod game;
pub mod mark;
pub mod network;
pub mod role;
pub mod server;

pub use board::{Board, FinishedReason, Square, TurnError};
pub use clients::{ClientConnection, ClientIdentity, Clients};
pub use error::{ProtocolError, SessionError};
pub use event::{GameEvent, Placement};
pub use game::{Game, GameEndReason, GameStatus, InterruptedReason};
pub use mark::Mark;
pub use role::{Role, Roles};
