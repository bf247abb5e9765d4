//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use staff_directory::inbound::http::internal_key::InternalApiKey;
use staff_directory::inbound::http::session_config::SessionSettings;
use staff_directory::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session: SessionSettings,
    pub(crate) internal_key: InternalApiKey,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration backed by the in-memory store.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        session: SessionSettings,
        internal_key: InternalApiKey,
    ) -> Self {
        Self {
            bind_addr,
            session,
            internal_key,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server stores users and invite codes in PostgreSQL
    /// instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
