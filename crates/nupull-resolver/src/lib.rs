//! Dependency resolution engine: breadth-first traversal of the dependency
//! graph under the minimum-version policy, producing a deduplicated set of
//! package identities.

pub mod error;
pub mod resolver;
pub mod spread;

pub use error::ResolveError;
pub use resolver::{resolve, resolve_root, ResolutionResult, UnresolvedEdge};
