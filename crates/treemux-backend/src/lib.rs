//! # treemux-backend
//!
//! Backend implementations for Treemux: the in-memory session store,
//! the remote HTTP backend, the read-only registry provider, the
//! disconnected stub, and snapshot persistence stores.

pub mod disconnected;
pub mod memory;
pub mod registry;
pub mod remote;
pub mod snapshot;

pub use disconnected::DisconnectedBackend;
pub use memory::MemoryBackend;
pub use registry::RegistryBackend;
pub use remote::RemoteBackend;
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore};
