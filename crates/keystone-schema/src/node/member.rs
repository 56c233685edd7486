use crate::{
    node::{AggregateId, MemberId},
    types::Primitive,
};
use serde::Serialize;

///
/// Member
///

#[derive(Clone, Debug, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub owner: AggregateId,
    pub name: String,
    pub display_name: String,
    pub route: String,
    pub kind: MemberKind,
}

impl Member {
    /// Whether the member contributes to its owner's effective key.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        match &self.kind {
            MemberKind::Value(v) => v.is_key,
            MemberKind::Variation(v) => v.is_key,
            MemberKind::Reference(r) => r.is_key,
            MemberKind::Child { .. } | MemberKind::Children { .. } => false,
        }
    }

    #[must_use]
    pub const fn is_display_name(&self) -> bool {
        match &self.kind {
            MemberKind::Value(v) => v.is_display_name,
            MemberKind::Variation(v) => v.is_display_name,
            MemberKind::Reference(r) => r.is_display_name,
            MemberKind::Child { .. } | MemberKind::Children { .. } => false,
        }
    }

    /// Aggregates owned through this member, in declaration order.
    #[must_use]
    pub fn owned(&self) -> Vec<AggregateId> {
        match &self.kind {
            MemberKind::Child { child } | MemberKind::Children { child } => vec![*child],
            MemberKind::Variation(v) => v.branches.iter().map(|b| b.aggregate).collect(),
            MemberKind::Value(_) | MemberKind::Reference(_) => Vec::new(),
        }
    }

    #[must_use]
    pub const fn as_reference(&self) -> Option<&ReferenceMember> {
        match &self.kind {
            MemberKind::Reference(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match &self.kind {
            MemberKind::Value(_) => "value",
            MemberKind::Child { .. } => "child",
            MemberKind::Children { .. } => "children",
            MemberKind::Variation(_) => "variation",
            MemberKind::Reference(_) => "reference",
        }
    }
}

///
/// MemberKind
///

#[derive(Clone, Debug, Serialize)]
pub enum MemberKind {
    Value(ValueMember),
    Child { child: AggregateId },
    Children { child: AggregateId },
    Variation(VariationMember),
    Reference(ReferenceMember),
}

///
/// ValueMember
///

#[derive(Clone, Debug, Serialize)]
pub struct ValueMember {
    pub primitive: Primitive,
    pub is_key: bool,
    pub is_required: bool,
    pub is_display_name: bool,
    pub db_name: String,
}

///
/// VariationMember
///

#[derive(Clone, Debug, Serialize)]
pub struct VariationMember {
    /// Name of the stored scalar holding the live branch's discriminator value.
    pub discriminator: String,
    pub branches: Vec<VariationBranch>,
    pub is_key: bool,
    pub is_required: bool,
    pub is_display_name: bool,
}

impl VariationMember {
    #[must_use]
    pub fn branch(&self, value: &str) -> Option<AggregateId> {
        self.branches
            .iter()
            .find(|b| b.value == value)
            .map(|b| b.aggregate)
    }
}

///
/// VariationBranch
///

#[derive(Clone, Debug, Serialize)]
pub struct VariationBranch {
    pub value: String,
    pub aggregate: AggregateId,
}

///
/// ReferenceMember
///

#[derive(Clone, Debug, Serialize)]
pub struct ReferenceMember {
    pub target: AggregateId,
    pub is_key: bool,
    pub is_required: bool,
    pub is_display_name: bool,
}
