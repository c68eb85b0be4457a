use std::sync::{Arc, Mutex};

use async_tungstenite::WebSocketStream;
use futures_io::{AsyncRead, AsyncWrite};
use futures_util::{Stream, StreamExt};
use lazy_static::lazy_static;
use log::{error, info, warn};
use prometheus::{Encoder, IntCounter, register_int_counter};
use serde::{Deserialize, Serialize};
use tictactoe_relay::clients::{ClientConnection, ClientIdentity};
use tictactoe_relay::error::SessionError;
use tictactoe_relay::mark::Mark;
use tictactoe_relay::server::{IncomingEvent, ServerState};
use tide::StatusCode;
use tungstenite::protocol::{self, Message};

use crate::http_server_state::*;
use crate::identity::IdentityMiddleware;
use crate::network::{self, CommunicationError};
use crate::server_config::{AllowedOrigin, ServerConfig};


lazy_static! {
    static ref BAD_MESSAGES: IntCounter =
        register_int_counter!("bad_messages", "Websocket messages that could not be parsed.")
            .unwrap();
    static ref CONNECTIONS_OPENED: IntCounter =
        register_int_counter!("connections_opened", "Websocket connections accepted.").unwrap();
}

#[derive(Deserialize)]
struct StartGameQuery {
    mark: Mark,
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

fn apply_event(server_state: &Mutex<ServerState>, event: IncomingEvent) {
    match server_state.lock() {
        Ok(mut state) => state.apply_event(event),
        Err(_) => error!("Server state is poisoned, dropping {:?}", event),
    }
}

// Feeds client messages to the server until the socket goes away. Messages that cannot be parsed
// are skipped, the connection stays open.
async fn read_client_events<R>(
    stream_rx: &mut R, connection: &ClientConnection, server_state: &Mutex<ServerState>,
) where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        match network::read_event_async(stream_rx).await {
            Ok(ev) => {
                apply_event(server_state, IncomingEvent::Network(connection.clone(), ev));
            }
            Err(CommunicationError::Protocol(err)) => {
                BAD_MESSAGES.inc();
                warn!("Dropping message from client {}: {}", connection.identity, err);
            }
            Err(CommunicationError::ConnectionClosed) => {
                info!("Client {} closed the connection", connection.identity);
                return;
            }
            Err(err) => {
                warn!("Client {} disconnected due to read error: {:?}", connection.identity, err);
                return;
            }
        }
    }
}

async fn handle_connection<S: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static>(
    peer_addr: String, identity: ClientIdentity, stream: WebSocketStream<S>,
    server_state: Arc<Mutex<ServerState>>,
) -> tide::Result<()> {
    let (mut stream_tx, mut stream_rx) = stream.split();
    CONNECTIONS_OPENED.inc();
    info!("Client {} connected from {}", identity, peer_addr);

    let (client_tx, client_rx) = async_std::channel::unbounded();
    let connection = ClientConnection::new(identity, client_tx);

    // Client -> Server
    let reader_connection = connection.clone();
    let reader_state = Arc::clone(&server_state);
    async_std::task::spawn(async move {
        read_client_events(&mut stream_rx, &reader_connection, &reader_state).await;
        // Stops the writer below once the queued events are flushed.
        reader_connection.events_tx.close();
        apply_event(&reader_state, IncomingEvent::Disconnected(reader_connection));
    });

    // Server -> Client
    while let Ok(ev) = client_rx.recv().await {
        if let Err(err) = network::write_event_async(&mut stream_tx, &ev).await {
            warn!("Client {} disconnected due to write error: {:?}", connection.identity, err);
            apply_event(&server_state, IncomingEvent::Disconnected(connection.clone()));
            break;
        }
    }

    Ok(())
}

fn check_origin(
    req: &tide::Request<HttpServerState>, allowed_origin: &AllowedOrigin,
) -> tide::Result<()> {
    match allowed_origin {
        AllowedOrigin::Any => Ok(()),
        AllowedOrigin::ThisSite(site) => {
            let origin = req
                .header(http_types::headers::ORIGIN)
                .map(|values| values.last().as_str().to_owned());
            if origin.as_deref() == Some(site.as_str()) {
                Ok(())
            } else {
                Err(tide::Error::from_str(
                    StatusCode::Forbidden,
                    format!("Origin {origin:?} is not allowed"),
                ))
            }
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> tide::Result {
    let mut resp = tide::Response::new(status);
    resp.set_body(tide::Body::from_json(value)?);
    Ok(resp)
}

fn session_error_response(err: SessionError) -> tide::Result {
    let status = match err {
        SessionError::Unauthorized { .. } => StatusCode::Forbidden,
        SessionError::IllegalMove(_) | SessionError::NoActiveGame => StatusCode::BadRequest,
    };
    json_response(status, &MessageBody { message: err.to_string() })
}

async fn handle_game_ws(req: tide::Request<HttpServerState>) -> tide::Result {
    check_origin(&req, &req.state().allowed_origin)?;
    let identity = get_identity(&req)?;
    let peer_addr = req.peer_addr().map_or_else(
        || Err(tide::Error::from_str(StatusCode::Forbidden, "Peer address missing")),
        |x| Ok(x.to_owned()),
    )?;
    let server_state = Arc::clone(&req.state().server_state);

    // tide::Request -> http_types::Request -> http::Request<Body> -> http::Request<()>.
    let http_types_req: http_types::Request = req.into();
    let http_req_with_body: http::Request<http_types::Body> = http_types_req.into();
    let http_req = http_req_with_body.map(|_| ());

    let http_resp = tungstenite::handshake::server::create_response(&http_req)
        .map_err(|e| tide::Error::new(StatusCode::BadRequest, e))?;

    // http::Response<()> -> http::Response<Body> -> http_types::Response
    let http_resp_with_body = http_resp.map(|_| http_types::Body::empty());
    let mut http_types_resp: http_types::Response = http_resp_with_body.into();

    // http_types::Response hands the raw stream back once the upgrade is done.
    let upgrade_receiver = http_types_resp.recv_upgrade().await;

    async_std::task::spawn(async move {
        if let Some(stream) = upgrade_receiver.await {
            let stream =
                WebSocketStream::from_raw_socket(stream, protocol::Role::Server, None).await;
            if let Err(err) = handle_connection(peer_addr, identity, stream, server_state).await {
                error!("{}", err);
            }
        } else {
            error!("Never received an upgrade for client {}", peer_addr);
        }
    });
    Ok(http_types_resp.into())
}

async fn handle_client_information(req: tide::Request<HttpServerState>) -> tide::Result {
    let identity = get_identity(&req)?;
    let info = req.state().lock_server()?.client_information(&identity);
    json_response(StatusCode::Ok, &info)
}

async fn handle_game_state(req: tide::Request<HttpServerState>) -> tide::Result {
    let identity = get_identity(&req)?;
    let snapshot = {
        let server = req.state().lock_server()?;
        server.current_state(server.role_of(&identity))
    };
    match snapshot {
        Ok(snapshot) => json_response(StatusCode::Ok, &snapshot),
        Err(err) => session_error_response(err),
    }
}

async fn handle_start_game(req: tide::Request<HttpServerState>) -> tide::Result {
    let identity = get_identity(&req)?;
    let query: StartGameQuery = req.query()?;
    let result = req.state().lock_server()?.start_game(&identity, query.mark);
    match result {
        Ok(()) => json_response(StatusCode::Ok, &MessageBody { message: "success".to_owned() }),
        Err(err) => session_error_response(err),
    }
}

async fn handle_metrics(_req: tide::Request<HttpServerState>) -> tide::Result {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| tide::Error::new(StatusCode::InternalServerError, e))?;
    let body = String::from_utf8(buffer)?;
    let mut resp = tide::Response::new(StatusCode::Ok);
    resp.set_body(body);
    Ok(resp)
}

async fn handle_server_info(req: tide::Request<HttpServerState>) -> tide::Result {
    let body = {
        let server = req.state().lock_server()?;
        let seat = |identity: Option<&ClientIdentity>| match identity {
            Some(identity) => identity.to_string(),
            None => "-".to_owned(),
        };
        let game = match server.game() {
            None => "none".to_owned(),
            Some(game) => match game.status().end_reason() {
                None => format!("in progress, {} to move", game.active_mark()),
                Some(reason) => format!("over ({reason:?})"),
            },
        };
        format!(
            "Connected clients: {}\nHost: {}\nGuest: {}\nConnected spectators: {}\nGame: {}\n",
            server.clients().len(),
            seat(server.roles().host()),
            seat(server.roles().guest()),
            server.num_connected_spectators(),
            game,
        )
    };
    let mut resp = tide::Response::new(StatusCode::Ok);
    resp.set_body(body);
    Ok(resp)
}

fn build_app(config: &ServerConfig) -> tide::Server<HttpServerState> {
    let mut app = tide::with_state(Arc::new(HttpServerStateImpl {
        server_state: Arc::new(Mutex::new(ServerState::new())),
        allowed_origin: config.allowed_origin.clone(),
        identity_cookie: config.identity_cookie.clone(),
    }));

    app.with(tide::utils::After(|mut res: tide::Response| async {
        if let Some(err) = res.error() {
            let msg = format!("Error: {}", err);
            res.set_status(err.status());
            res.set_body(msg);
        }
        Ok(res)
    }));

    app.at("/").get(tide::Redirect::new("/home"));
    // Only game routes identify the caller. Monitoring must not take player seats.
    app.at("/game-ws").with(IdentityMiddleware).get(handle_game_ws);
    app.at("/api/client-information").with(IdentityMiddleware).get(handle_client_information);
    app.at("/api/game-state").with(IdentityMiddleware).get(handle_game_state);
    app.at("/api/start-game").with(IdentityMiddleware).post(handle_start_game);
    app.at("/dyn/metrics").get(handle_metrics);
    app.at("/dyn/server").get(handle_server_info);
    app
}

pub fn run(config: ServerConfig) -> anyhow::Result<()> {
    let app = build_app(&config);
    info!("Starting server on port {}", config.port);
    async_std::task::block_on(async { app.listen(format!("0.0.0.0:{}", config.port)).await })?;
    Ok(())
}
