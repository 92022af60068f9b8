//! Shared value types: the universal tree node and virtual paths.

pub mod node;
pub mod path;

pub use node::{NodeKind, TreeNode};
pub use path::VirtualPath;
