//! # treemux-api
//!
//! HTTP surface for Treemux: the navigation API parameterized by
//! absolute virtual paths. Every capability method of the router layer
//! is exposed as one route; the path router resolves internally before
//! delegating.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
