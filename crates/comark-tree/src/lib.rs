//! Owned document tree and JSON serialization.
//!
//! [`TreeBuilder`] accumulates parse events into an owned [`Node`] tree,
//! applying text-merge and leaf-container rules. The finished tree
//! serializes to either of two JSON schemas:
//!
//! - [`compact`]: the primary tuple form —
//!   `{"type":"comark","value":[["h1",{},"Hi"], ...]}`
//! - [`verbose`]: the legacy object-tree form —
//!   `{"type": "heading", "level": 1, "children": [...]}`
//!
//! Neither schema supersedes the other; both are kept.

pub mod builder;
pub mod compact;
mod node;
pub mod verbose;

pub use builder::{build_tree, TreeBuilder, TreeError};
pub use node::{Detail, Element, Node, Tag, TextCategory, MAX_DEPTH};
