//! HTTP server configuration object and helpers.

use std::sync::Arc;

use apid::domain::ports::UserDirectory;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) users: Arc<dyn UserDirectory>,
}

impl ServerConfig {
    /// Construct a server configuration around the wired user directory.
    #[must_use]
    pub fn new(bind_addr: (String, u16), users: Arc<dyn UserDirectory>) -> Self {
        Self { bind_addr, users }
    }
}
