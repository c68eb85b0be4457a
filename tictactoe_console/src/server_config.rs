use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};


pub const DEFAULT_PORT: u16 = tictactoe_relay::network::PORT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllowedOrigin {
    Any,
    ThisSite(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCookieOptions {
    pub name: String,
    // How long the browser keeps the identity. Once it expires, the browser is a stranger again
    // and can only become a spectator.
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
}

impl Default for IdentityCookieOptions {
    fn default() -> Self {
        IdentityCookieOptions {
            name: "id".to_owned(),
            max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

// Example:
//   port: 3000
//   allowed_origin: !ThisSite https://tictactoe.example.com
//   identity_cookie:
//     name: id
//     max_age: 1day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: AllowedOrigin,
    #[serde(default)]
    pub identity_cookie: IdentityCookieOptions,
}

fn default_port() -> u16 { DEFAULT_PORT }
fn default_allowed_origin() -> AllowedOrigin { AllowedOrigin::Any }

impl ServerConfig {
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).context("Failed to parse server config")
    }

    pub fn read_file(filename: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(filename)
            .with_context(|| format!("Failed to read config file '{filename}'"))?;
        Self::parse(&contents)
    }
}
