//! Resolution engine over the aggregate schema graph: effective keys,
//! entry-relative paths, instance key encoding and the read-only [`Model`]
//! emitters work from.

pub mod display;
pub mod error;
pub mod instance;
pub mod key;
pub mod model;
pub mod path;

pub use error::{Error, ModelError};
pub use model::Model;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        display::DisplaySlot,
        error::{Error, ModelError},
        instance::{InstanceIdentity, InstanceKey, KeyCodecError, KeyShape, KeyTag, KeyValue},
        key::{EffectiveKey, KeyError, KeyResolver, KeySlot, SlotOrigin},
        model::{AggregateView, Model, ResolvedMember, Visitor, Walk},
        path::{Path, PathSegment, PathTarget, SegmentKind, UnreachableMember},
    };
}

#[cfg(test)]
pub(crate) mod test_fixtures;
