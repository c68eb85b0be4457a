// Improvement potential. Push placements to spectators as well. For now they have to poll
//   `current_state`.

use lazy_static::lazy_static;
use log::{error, info, warn};
use prometheus::{IntCounter, register_int_counter};
use serde::Serialize;

use crate::board::{Board, TurnError};
use crate::clients::{ClientConnection, ClientIdentity, Clients};
use crate::error::SessionError;
use crate::event::{GameEvent, Placement};
use crate::game::{Game, GameEndReason, InterruptedReason};
use crate::internal_error_message;
use crate::mark::Mark;
use crate::role::{Role, Roles};


lazy_static! {
    static ref GAMES_STARTED: IntCounter =
        register_int_counter!("games_started", "Games started by the host.").unwrap();
    static ref GAMES_FINISHED: IntCounter =
        register_int_counter!("games_finished", "Games that ended with a win or a tie.").unwrap();
    static ref GAMES_INTERRUPTED: IntCounter =
        register_int_counter!("games_interrupted", "Games ended by resignation or abort.").unwrap();
    static ref PLACEMENTS_RELAYED: IntCounter =
        register_int_counter!("placements_relayed", "Legal placements forwarded to the opponent.")
            .unwrap();
    static ref ACTIONS_REJECTED: IntCounter =
        register_int_counter!("actions_rejected", "Player actions dropped as illegal.").unwrap();
}

#[derive(Debug)]
pub enum IncomingEvent {
    Network(ClientConnection, GameEvent),
    Disconnected(ClientConnection),
}

// What a polling client sees. Always an owned copy: later moves never change a snapshot that has
// already been handed out.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub host_mark: Mark,
    pub board: Board,
    pub active_mark: Mark,
    pub starting_mark: Mark,
    pub game_end_reason: Option<GameEndReason>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInformation {
    pub client_type: Role,
    pub is_game_active: bool,
}

// The authoritative session: role table, connection registry and the current game (if any).
// Every method is expected to run under a single lock, so each incoming message is processed
// atomically.
pub struct ServerState {
    clients: Clients,
    roles: Roles,
    game: Option<Game>,
}

impl ServerState {
    pub fn new() -> Self {
        ServerState {
            clients: Clients::new(),
            roles: Roles::new(),
            game: None,
        }
    }

    pub fn clients(&self) -> &Clients { &self.clients }
    pub fn roles(&self) -> &Roles { &self.roles }
    pub fn game(&self) -> Option<&Game> { self.game.as_ref() }

    pub fn assign_role(&mut self, identity: &ClientIdentity) -> Role {
        let was_seated = self.roles.is_seated(identity);
        let role = self.roles.assign(identity);
        if !was_seated && role.is_player() {
            info!("Client {} joined as {:?}", identity, role);
        }
        role
    }

    pub fn role_of(&self, identity: &ClientIdentity) -> Role { self.roles.role_of(identity) }

    pub fn num_connected_spectators(&self) -> usize {
        self.clients.identities().filter(|id| self.role_of(id) == Role::Spectator).count()
    }

    pub fn is_game_active(&self) -> bool { self.game.as_ref().is_some_and(|g| !g.is_over()) }
    pub fn is_game_ended(&self) -> bool { self.game.as_ref().is_some_and(Game::is_over) }
    pub fn game_end_reason(&self) -> Option<GameEndReason> {
        self.game.as_ref().and_then(|g| g.status().end_reason())
    }

    pub fn client_information(&self, identity: &ClientIdentity) -> ClientInformation {
        ClientInformation {
            client_type: self.role_of(identity),
            is_game_active: self.is_game_active(),
        }
    }

    // Same payload for every role. Hiding anything from spectators is up to the caller.
    pub fn current_state(&self, _role: Role) -> Result<GameSnapshot, SessionError> {
        let game = self.game.as_ref().ok_or(SessionError::NoActiveGame)?;
        Ok(GameSnapshot {
            host_mark: game.host_mark(),
            board: *game.board(),
            active_mark: game.active_mark(),
            starting_mark: game.starting_mark(),
            game_end_reason: game.status().end_reason(),
        })
    }

    pub fn apply_event(&mut self, event: IncomingEvent) {
        match event {
            IncomingEvent::Network(connection, event) => {
                self.process_network_event(connection, event);
            }
            IncomingEvent::Disconnected(connection) => {
                if self.clients.remove_connection(&connection) {
                    info!("Client {} disconnected", connection.identity);
                }
            }
        }
    }

    fn process_network_event(&mut self, connection: ClientConnection, event: GameEvent) {
        let identity = connection.identity.clone();
        match event {
            GameEvent::RegisterConnection => {
                info!("Client {} registered a connection", identity);
                self.clients.register(connection);
            }
            GameEvent::Placement(placement) => {
                self.handle_placement(&identity, placement);
            }
            GameEvent::GameInterrupted { reason } => {
                self.handle_interrupt(&identity, reason);
            }
            GameEvent::GameStarted | GameEvent::GameFinished { .. } => {
                warn!(
                    "Client {} sent a server-only message \"{}\", ignoring",
                    identity,
                    event.type_name()
                );
            }
        }
    }

    pub fn start_game(
        &mut self, identity: &ClientIdentity, host_mark: Mark,
    ) -> Result<(), SessionError> {
        let role = self.role_of(identity);
        if role != Role::Host {
            warn!("Client {} ({:?}) tried to start a game", identity, role);
            return Err(SessionError::Unauthorized { role });
        }
        if self.is_game_active() {
            info!("Host abandons the current game to start a new one");
        }
        self.game = Some(Game::new(host_mark));
        GAMES_STARTED.inc();
        info!("Game started, host plays {}", host_mark);
        self.send_to_role(Role::Guest, GameEvent::GameStarted);
        Ok(())
    }

    // Illegal placements are logged and dropped: the sender is not notified and nothing is relayed.
    pub fn handle_placement(&mut self, identity: &ClientIdentity, placement: Placement) {
        if let Err(err) = self.try_placement(identity, placement) {
            ACTIONS_REJECTED.inc();
            warn!("Dropping placement {:?} from client {}: {}", placement, identity, err);
        }
    }

    pub fn try_placement(
        &mut self, identity: &ClientIdentity, placement: Placement,
    ) -> Result<(), SessionError> {
        let role = self.roles.role_of(identity);
        let game = self.game.as_mut().ok_or(SessionError::NoActiveGame)?;
        if game.is_over() {
            return Err(TurnError::GameOver.into());
        }
        let Some(player_mark) = game.mark_of(role) else {
            return Err(SessionError::Unauthorized { role });
        };
        if player_mark != game.active_mark() {
            return Err(TurnError::WrongTurn.into());
        }
        if placement.mark != player_mark {
            return Err(TurnError::WrongMark.into());
        }
        game.try_place(placement.mark, placement.square)?;
        let end_reason = game.status().end_reason();

        let Some(opponent) = role.opponent() else {
            error!("{}", internal_error_message!("player role {:?} has no opponent", role));
            return Ok(());
        };
        if self.send_to_role(opponent, GameEvent::Placement(placement)) {
            PLACEMENTS_RELAYED.inc();
        }
        match end_reason {
            None => {}
            Some(GameEndReason::Finished(reason)) => {
                GAMES_FINISHED.inc();
                match reason.winner() {
                    Some(mark) => info!("Game finished, {} won", mark),
                    None => info!("Game finished in a tie"),
                }
                self.send_to_players(GameEvent::GameFinished { reason });
            }
            Some(GameEndReason::Interrupted(reason)) => {
                error!("{}", internal_error_message!("placement ended the game with {:?}", reason));
            }
        }
        Ok(())
    }

    pub fn handle_interrupt(&mut self, identity: &ClientIdentity, reason: InterruptedReason) {
        if let Err(err) = self.try_interrupt(identity, reason) {
            ACTIONS_REJECTED.inc();
            warn!("Dropping interrupt {:?} from client {}: {}", reason, identity, err);
        }
    }

    // Unlike placements, interrupts are accepted regardless of whose turn it is.
    pub fn try_interrupt(
        &mut self, identity: &ClientIdentity, reason: InterruptedReason,
    ) -> Result<(), SessionError> {
        let role = self.roles.role_of(identity);
        if !role.is_player() {
            return Err(SessionError::Unauthorized { role });
        }
        let game = self.game.as_mut().ok_or(SessionError::NoActiveGame)?;
        // A player can only resign for themselves.
        if let Some(player_mark) = game.mark_of(role) {
            if reason != InterruptedReason::Aborted
                && reason != InterruptedReason::resignation(player_mark)
            {
                return Err(TurnError::WrongMark.into());
            }
        }
        game.interrupt(reason)?;
        GAMES_INTERRUPTED.inc();
        info!("Game interrupted by {:?}: {:?}", role, reason);
        self.send_to_players(GameEvent::GameInterrupted { reason });
        Ok(())
    }

    fn send_to_role(&self, role: Role, event: GameEvent) -> bool {
        match self.roles.identity_of(role) {
            Some(identity) => self.clients.send(identity, event),
            None => false,
        }
    }

    fn send_to_players(&self, event: GameEvent) {
        for role in [Role::Host, Role::Guest] {
            self.send_to_role(role, event.clone());
        }
    }
}
