use std::fmt;

use async_tungstenite::WebSocketStream;
use futures_io::{AsyncRead, AsyncWrite};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use tictactoe_relay::error::ProtocolError;
use tictactoe_relay::event::GameEvent;
use tictactoe_relay::network::{parse_event, serialize_event};
use tungstenite::protocol::Message;


#[derive(Debug)]
pub enum CommunicationError {
    ConnectionClosed,
    Socket(tungstenite::Error),
    Serialization(serde_json::Error),
    // The socket is fine, but the message cannot be understood. The connection can go on.
    Protocol(ProtocolError),
}

impl fmt::Display for CommunicationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommunicationError::ConnectionClosed => write!(f, "connection closed"),
            CommunicationError::Socket(err) => write!(f, "socket error: {err}"),
            CommunicationError::Serialization(err) => write!(f, "cannot serialize event: {err}"),
            CommunicationError::Protocol(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommunicationError {}

pub async fn read_event_async<R>(stream: &mut R) -> Result<GameEvent, CommunicationError>
where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let msg = match stream.next().await {
            None | Some(Err(tungstenite::Error::ConnectionClosed)) => {
                return Err(CommunicationError::ConnectionClosed);
            }
            Some(Err(err)) => return Err(CommunicationError::Socket(err)),
            Some(Ok(msg)) => msg,
        };
        match msg {
            Message::Text(text) => {
                return parse_event(text.as_str()).map_err(CommunicationError::Protocol);
            }
            Message::Binary(_) => {
                return Err(CommunicationError::Protocol(ProtocolError::NonTextFrame));
            }
            Message::Close(_) => return Err(CommunicationError::ConnectionClosed),
            // Pings are answered by tungstenite itself.
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
}

pub async fn write_event_async<S>(
    sink: &mut SplitSink<WebSocketStream<S>, Message>, event: &GameEvent,
) -> Result<(), CommunicationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let serialized = serialize_event(event).map_err(CommunicationError::Serialization)?;
    sink.send(Message::text(serialized)).await.map_err(CommunicationError::Socket)
}
