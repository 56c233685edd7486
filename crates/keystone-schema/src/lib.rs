pub mod build;
pub mod error;
pub mod node;
pub mod source;
pub mod types;

/// Separator used when rendering node routes and reference target paths.
pub const ROUTE_SEPARATOR: char = '/';

/// Optional prefix accepted in front of reference target paths.
pub const REF_TARGET_PREFIX: &str = "ref-to:";

/// Hop name recorded in key and display paths for a slot inherited from the
/// owner. Reference members may not take this name.
pub const PARENT_HOP: &str = "parent";

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{BuildError, SchemaBuilder},
        error::{ErrorTree, SchemaError},
        node::*,
        source::{NodeId, NodeRecord, RelationKind},
        types::{Primitive, Role},
    };
    pub use serde::Serialize;
}

#[cfg(test)]
pub(crate) mod test_fixtures;
