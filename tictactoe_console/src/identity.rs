// Browser identity. A long-lived cookie holding a random UUID stands in for accounts: whoever
// holds the cookie is that player. The role is assigned on the very first request, so the first
// two browsers to open any page become host and guest.

use log::debug;
use tictactoe_relay::clients::ClientIdentity;
use uuid::Uuid;

use crate::http_server_state::HttpServerState;
use crate::server_config::IdentityCookieOptions;


pub struct IdentityMiddleware;

pub fn set_cookie_header(options: &IdentityCookieOptions, identity: &ClientIdentity) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        options.name,
        identity,
        options.max_age.as_secs()
    )
}

#[async_trait::async_trait]
impl tide::Middleware<HttpServerState> for IdentityMiddleware {
    async fn handle(
        &self, mut req: tide::Request<HttpServerState>, next: tide::Next<'_, HttpServerState>,
    ) -> tide::Result {
        let state = HttpServerState::clone(req.state());
        let existing = req
            .cookie(&state.identity_cookie.name)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty());
        let (identity, is_new) = match existing {
            Some(value) => (ClientIdentity::new(value), false),
            None => (ClientIdentity::new(Uuid::new_v4().to_string()), true),
        };
        if is_new {
            debug!("Issuing new identity {}", identity);
        }
        state.lock_server()?.assign_role(&identity);
        req.set_ext(identity.clone());

        let mut res = next.run(req).await;
        if is_new {
            res.append_header("Set-Cookie", set_cookie_header(&state.identity_cookie, &identity));
        }
        Ok(res)
    }
}
