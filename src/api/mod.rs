//! Typed client for the Trazo REST API
//!
//! [`ApiClient`] is the façade the CLI and library consumers hold. It
//! owns the transport and the session manager and exposes one method per
//! server operation, grouped by resource family:
//!
//! - [`projects`] -- project CRUD and the collaborator policies
//! - [`diagrams`] -- diagram CRUD and the conflict-aware content updater
//!
//! Every authenticated call routes its result through the session
//! manager's `401` interception, so an expired token tears the session
//! down exactly once no matter which call observes it.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::Result;
use crate::models::HasId;
use crate::session::{SessionManager, SessionStore};
use crate::transport::Transport;

pub mod diagrams;
pub mod projects;

pub use projects::CollaboratorRef;

/// Façade over the transport and session manager.
///
/// Cloning is cheap and shares all underlying state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Transport,
    session: SessionManager,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// Resolves the session store at its default location and wires the
    /// session manager to the transport. No network I/O happens here;
    /// call [`SessionManager::init`] to rehydrate a persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ApiError::InvalidBaseUrl`] when the
    /// configured base URL does not parse, or a storage error when the
    /// data directory cannot be resolved.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Transport::new(&config.server.base_url)?;
        let store = SessionStore::new()?;
        let session = SessionManager::new(transport.clone(), store);
        Ok(Self { transport, session })
    }

    /// Build a client from already-constructed parts.
    ///
    /// Useful in tests, where the transport targets a mock server and
    /// the store points at a temporary file.
    pub fn with_parts(transport: Transport, session: SessionManager) -> Self {
        Self { transport, session }
    }

    /// The session manager behind this client.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The transport behind this client.
    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }
}

/// Collapse duplicate ids out of a server-provided list.
///
/// The server is known to return the same resource twice in some
/// paginated and join-backed listings. The result keeps one entry per
/// id: the last occurrence wins, seated at the position where the id
/// first appeared, so the overall ordering is stable.
pub fn dedupe_by_id<T: HasId>(items: Vec<T>) -> Vec<T> {
    let mut seen_at: HashMap<i64, usize> = HashMap::new();
    let mut result: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match seen_at.get(&item.id()) {
            Some(&position) => result[position] = item,
            None => {
                seen_at.insert(item.id(), result.len());
                result.push(item);
            }
        }
    }

    result
}
