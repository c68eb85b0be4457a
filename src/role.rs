use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::clients::ClientIdentity;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    // The first identity seen by the server. The only one allowed to start games.
    Host,

    // The second distinct identity. Plays against the host.
    Guest,

    // Everybody else. Can watch (by polling the game state), but cannot affect the game.
    Spectator,
}

impl Role {
    pub fn is_player(self) -> bool { matches!(self, Role::Host | Role::Guest) }

    pub fn opponent(self) -> Option<Role> {
        match self {
            Role::Host => Some(Role::Guest),
            Role::Guest => Some(Role::Host),
            Role::Spectator => None,
        }
    }
}

// First-come role table. Only the two player seats are stored: anybody else is a spectator, so
// the table does not grow with the number of visitors. Seats are never reassigned, an identity
// keeps its role for the lifetime of the process, even after disconnecting.
#[derive(Debug, Default)]
pub struct Roles {
    host: Option<ClientIdentity>,
    guest: Option<ClientIdentity>,
}

impl Roles {
    pub fn new() -> Self { Self::default() }

    pub fn host(&self) -> Option<&ClientIdentity> { self.host.as_ref() }
    pub fn guest(&self) -> Option<&ClientIdentity> { self.guest.as_ref() }

    pub fn identity_of(&self, role: Role) -> Option<&ClientIdentity> {
        match role {
            Role::Host => self.host(),
            Role::Guest => self.guest(),
            Role::Spectator => None,
        }
    }

    pub fn assign(&mut self, identity: &ClientIdentity) -> Role {
        if let Some(role) = self.seat_of(identity) {
            return role;
        }
        if self.host.is_none() {
            self.host = Some(identity.clone());
            Role::Host
        } else if self.guest.is_none() {
            self.guest = Some(identity.clone());
            Role::Guest
        } else {
            Role::Spectator
        }
    }

    pub fn is_seated(&self, identity: &ClientIdentity) -> bool { self.seat_of(identity).is_some() }

    pub fn role_of(&self, identity: &ClientIdentity) -> Role {
        self.seat_of(identity).unwrap_or(Role::Spectator)
    }

    fn seat_of(&self, identity: &ClientIdentity) -> Option<Role> {
        if self.host.as_ref() == Some(identity) {
            Some(Role::Host)
        } else if self.guest.as_ref() == Some(identity) {
            Some(Role::Guest)
        } else {
            None
        }
    }
}
