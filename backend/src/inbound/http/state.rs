//! Shared HTTP adapter state.
//!
//! HTTP handlers reach this state through the request context so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserDirectory;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserDirectory>,
}

impl HttpState {
    /// Construct state from the user directory port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use actix_web::web;
    /// use apid::domain::UserDirectoryService;
    /// use apid::inbound::http::state::HttpState;
    /// use apid::outbound::memory::InMemoryUserRepository;
    /// use mockable::DefaultClock;
    ///
    /// let service = UserDirectoryService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let state = web::Data::new(HttpState::new(Arc::new(service)));
    /// # let _ = state;
    /// ```
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}
