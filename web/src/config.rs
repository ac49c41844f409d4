//! Server configuration.
//!
//! Configuration comes from the environment; `main` loads a `.env` file
//! first when one exists. Nothing here is read by the engine itself.

use anyhow::Context;
use encore_core::{Actor, ActorId, ActorRole};
use std::net::SocketAddr;
use uuid::Uuid;

/// Default bind address when `ENCORE_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string (`DATABASE_URL`).
    pub database_url: String,

    /// Socket address to listen on (`ENCORE_BIND_ADDR`).
    pub bind_addr: SocketAddr,

    /// Shared operator bearer token (`ENCORE_OPERATOR_TOKEN`).
    pub operator_token: String,

    /// Identity recorded on operator transitions (`ENCORE_OPERATOR_ID`,
    /// random when unset).
    pub operator: Actor,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` or `ENCORE_OPERATOR_TOKEN` is
    /// missing, or when `ENCORE_BIND_ADDR` / `ENCORE_OPERATOR_ID` do not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = std::env::var("ENCORE_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("ENCORE_BIND_ADDR must be a socket address")?;

        let operator_token = std::env::var("ENCORE_OPERATOR_TOKEN")
            .context("ENCORE_OPERATOR_TOKEN must be set")?;

        let operator_id = match std::env::var("ENCORE_OPERATOR_ID") {
            Ok(raw) => ActorId(
                Uuid::parse_str(&raw).context("ENCORE_OPERATOR_ID must be a UUID")?,
            ),
            Err(_) => ActorId(Uuid::new_v4()),
        };

        Ok(Self {
            database_url,
            bind_addr,
            operator_token,
            operator: Actor {
                id: operator_id,
                role: ActorRole::Operator,
            },
        })
    }
}
