use crate::{
    node::{AggregateId, MemberId},
    types::Role,
};
use serde::Serialize;

///
/// Aggregate
///

#[derive(Clone, Debug, Serialize)]
pub struct Aggregate {
    pub id: AggregateId,
    pub physical_name: String,
    pub display_name: String,
    pub db_name: String,
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerEdge>,

    /// Members in declaration order.
    pub members: Vec<MemberId>,

    /// `/`-joined physical names from the root.
    pub route: String,
}

impl Aggregate {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.role.is_root()
    }

    #[must_use]
    pub fn parent(&self) -> Option<AggregateId> {
        self.owner.map(|edge| edge.parent)
    }

    /// Name this aggregate is addressed by when used as a reference target.
    #[must_use]
    pub fn ref_entry_name(&self) -> String {
        format!("{}{}", crate::REF_TARGET_PREFIX, self.route)
    }
}

///
/// OwnerEdge
/// The single ownership edge of a non-root aggregate.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct OwnerEdge {
    pub parent: AggregateId,

    /// The Child, Children or Variation member of `parent` that owns the aggregate.
    pub member: MemberId,
}
