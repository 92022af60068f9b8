//! Router-level events: backend registry and connection-state changes.

use serde::{Deserialize, Serialize};

/// Events that invalidate the displayable tree snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VfsEvent {
    /// A backend profile was added to the registry.
    BackendRegistered {
        /// Profile name (also its mount segment).
        name: String,
        /// The backend kind.
        kind: String,
    },
    /// A backend profile was removed from the registry.
    BackendUnregistered {
        /// Profile name.
        name: String,
    },
    /// A backend transitioned between connected and disconnected.
    ConnectionChanged {
        /// Profile name.
        name: String,
        /// The new connectivity state.
        connected: bool,
    },
}
