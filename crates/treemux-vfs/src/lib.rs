//! # treemux-vfs
//!
//! The router layer of Treemux: maps absolute virtual paths to backends,
//! assembles displayable tree snapshots across every configured backend,
//! and exposes the navigation facade the UI layer calls.

pub mod builder;
pub mod groups;
pub mod home;
pub mod patcher;
pub mod registry;
pub mod router;
pub mod service;

pub use builder::TreeBuilder;
pub use groups::{GroupKind, GroupTable};
pub use home::HomeAggregator;
pub use patcher::LazyLoadPatcher;
pub use registry::{BackendRegistry, RemoteProfile};
pub use router::{Mount, PathRouter, Resolution};
pub use service::VfsService;
