use std::sync::{Arc, Mutex, MutexGuard};

use tictactoe_relay::clients::ClientIdentity;
use tictactoe_relay::server::ServerState;
use tide::StatusCode;

use crate::server_config::{AllowedOrigin, IdentityCookieOptions};


pub struct HttpServerStateImpl {
    pub server_state: Arc<Mutex<ServerState>>,
    pub allowed_origin: AllowedOrigin,
    pub identity_cookie: IdentityCookieOptions,
}

pub type HttpServerState = Arc<HttpServerStateImpl>;

impl HttpServerStateImpl {
    pub fn lock_server(&self) -> tide::Result<MutexGuard<'_, ServerState>> {
        self.server_state.lock().map_err(|_| {
            tide::Error::from_str(StatusCode::InternalServerError, "Server state is poisoned")
        })
    }
}

// Identity attached by `IdentityMiddleware`. Every request that reaches a handler has one.
pub fn get_identity(req: &tide::Request<HttpServerState>) -> tide::Result<ClientIdentity> {
    req.ext::<ClientIdentity>().cloned().ok_or_else(|| {
        tide::Error::from_str(StatusCode::InternalServerError, "Client identity missing")
    })
}
