use std::fmt;

use crate::board::TurnError;
use crate::role::Role;


#[macro_export]
macro_rules! internal_error_message {
    () => {
        format!("Internal error at {}:{}.", file!(), line!())
    };
    ($($arg:tt)+) => {
        format!("Internal error at {}:{}: {}.", file!(), line!(), format!($($arg)*))
    };
}

// A wire message that could not be decoded. Never fatal: the message is dropped and the
// connection stays open.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ProtocolError {
    NotJson(String),
    MissingType,
    UnknownType(String),
    MalformedPayload { type_name: String, message: String },
    NonTextFrame,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::NotJson(message) => write!(f, "message is not valid JSON: {message}"),
            ProtocolError::MissingType => write!(f, "message has no \"type\" field"),
            ProtocolError::UnknownType(type_name) => {
                write!(f, "unknown message type \"{type_name}\"")
            }
            ProtocolError::MalformedPayload { type_name, message } => {
                write!(f, "malformed \"{type_name}\" message: {message}")
            }
            ProtocolError::NonTextFrame => write!(f, "expected a text frame"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SessionError {
    // The operation requires a different role. Nothing was changed.
    Unauthorized { role: Role },
    IllegalMove(TurnError),
    NoActiveGame,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Unauthorized { role } => write!(f, "not allowed for {role:?}"),
            SessionError::IllegalMove(err) => write!(f, "illegal move: {err}"),
            SessionError::NoActiveGame => write!(f, "No game is currently active"),
        }
    }
}

impl From<TurnError> for SessionError {
    fn from(err: TurnError) -> Self { SessionError::IllegalMove(err) }
}
