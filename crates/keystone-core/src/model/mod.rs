//! Read-only model handed to emitters.
//!
//! Every key, key shape and display slot list is resolved when the model is
//! built, so no query can fail on resolution later and the model can be
//! shared across threads as is.

mod visit;

#[cfg(test)]
mod tests;

pub use visit::*;

use crate::{
    display::{DisplaySlot, display_slots},
    error::ModelError,
    instance::{InstanceKey, KeyCodecError, KeyShape},
    key::{EffectiveKey, KeyResolver},
    path::{Path, PathTarget, UnreachableMember, path_from},
};
use keystone_config::GeneratorConfig;
use keystone_schema::prelude::*;

///
/// Model
///

#[derive(Debug)]
pub struct Model {
    schema: Schema,
    keys: Vec<EffectiveKey>,
    shapes: Vec<KeyShape>,
    display: Vec<Vec<DisplaySlot>>,
}

impl Model {
    /// Resolve every aggregate of `schema`. Fails with all key errors at once.
    pub fn new(schema: Schema, config: &GeneratorConfig) -> Result<Self, ModelError> {
        let keys = KeyResolver::resolve_all(&schema).map_err(ModelError::KeyResolution)?;
        let shapes = keys.iter().map(EffectiveKey::shape).collect();
        let display = schema
            .aggregates()
            .map(|a| {
                display_slots(
                    &schema,
                    a.id,
                    &keys[a.id.index()],
                    config.display.use_key_as_display_name,
                )
            })
            .collect();

        tracing::debug!(
            aggregates = schema.len(),
            roots = schema.roots().len(),
            "model resolved"
        );

        Ok(Self {
            schema,
            keys,
            shapes,
            display,
        })
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn roots(&self) -> &[AggregateId] {
        self.schema.roots()
    }

    #[must_use]
    pub fn aggregate(&self, id: AggregateId) -> &Aggregate {
        self.schema.aggregate(id)
    }

    #[must_use]
    pub fn member(&self, id: MemberId) -> &Member {
        self.schema.member(id)
    }

    /// Members of one aggregate in declaration order.
    pub fn members(&self, id: AggregateId) -> impl Iterator<Item = &Member> {
        self.schema.members(id)
    }

    /// Members with their kinds resolved against the model.
    #[must_use]
    pub fn resolved_members(&self, id: AggregateId) -> Vec<ResolvedMember<'_>> {
        self.members(id).map(|m| self.resolve_member(m)).collect()
    }

    #[must_use]
    pub fn find(&self, route: &str) -> Option<AggregateId> {
        self.schema.find(route)
    }

    #[must_use]
    pub fn effective_key(&self, id: AggregateId) -> &EffectiveKey {
        &self.keys[id.index()]
    }

    #[must_use]
    pub fn key_shape(&self, id: AggregateId) -> &KeyShape {
        &self.shapes[id.index()]
    }

    #[must_use]
    pub fn display_slots(&self, id: AggregateId) -> &[DisplaySlot] {
        &self.display[id.index()]
    }

    pub fn path_from(
        &self,
        entry: AggregateId,
        target: impl Into<PathTarget>,
    ) -> Result<Path, UnreachableMember> {
        path_from(&self.schema, entry, target)
    }

    #[must_use]
    pub fn encode_key(&self, key: &InstanceKey) -> String {
        key.encode()
    }

    /// Decode an instance key of aggregate `id`.
    pub fn decode_key(&self, id: AggregateId, text: &str) -> Result<InstanceKey, KeyCodecError> {
        InstanceKey::decode(text, self.key_shape(id))
    }

    /// Reference members anywhere in the model that point at `id`.
    #[must_use]
    pub fn referrers(&self, id: AggregateId) -> &[MemberId] {
        self.schema.referrers(id)
    }

    /// Roots in declaration order, then each root's owned aggregates in pre-order.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    #[must_use]
    pub fn view(&self, id: AggregateId) -> AggregateView<'_> {
        AggregateView {
            model: self,
            aggregate: self.aggregate(id),
            depth: self.schema.depth(id),
            effective_key: self.effective_key(id),
            members: self.resolved_members(id),
        }
    }

    fn resolve_member<'a>(&'a self, member: &'a Member) -> ResolvedMember<'a> {
        match &member.kind {
            MemberKind::Value(value) => ResolvedMember::Value { member, value },
            MemberKind::Child { child } => ResolvedMember::Child {
                member,
                child: *child,
            },
            MemberKind::Children { child } => ResolvedMember::Children {
                member,
                child: *child,
            },
            MemberKind::Variation(variation) => ResolvedMember::Variation { member, variation },
            MemberKind::Reference(reference) => ResolvedMember::Reference {
                member,
                reference,
                target_key: self.key_shape(reference.target),
            },
        }
    }
}

///
/// ResolvedMember
///
/// A reference exposes its target's identity shape; the target itself is
/// reached through its own view, never re-entered here.
///

#[derive(Clone, Copy, Debug)]
pub enum ResolvedMember<'a> {
    Value {
        member: &'a Member,
        value: &'a ValueMember,
    },
    Child {
        member: &'a Member,
        child: AggregateId,
    },
    Children {
        member: &'a Member,
        child: AggregateId,
    },
    Variation {
        member: &'a Member,
        variation: &'a VariationMember,
    },
    Reference {
        member: &'a Member,
        reference: &'a ReferenceMember,
        target_key: &'a KeyShape,
    },
}

impl<'a> ResolvedMember<'a> {
    #[must_use]
    pub const fn member(&self) -> &'a Member {
        match self {
            Self::Value { member, .. }
            | Self::Child { member, .. }
            | Self::Children { member, .. }
            | Self::Variation { member, .. }
            | Self::Reference { member, .. } => *member,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.member().name
    }
}

///
/// AggregateView
///

#[derive(Clone, Debug)]
pub struct AggregateView<'a> {
    model: &'a Model,
    pub aggregate: &'a Aggregate,

    /// Owning edges between the aggregate and its root.
    pub depth: usize,
    pub effective_key: &'a EffectiveKey,
    pub members: Vec<ResolvedMember<'a>>,
}

impl AggregateView<'_> {
    #[must_use]
    pub const fn id(&self) -> AggregateId {
        self.aggregate.id
    }

    #[must_use]
    pub fn key_shape(&self) -> &KeyShape {
        self.model.key_shape(self.aggregate.id)
    }

    #[must_use]
    pub fn display_slots(&self) -> &[DisplaySlot] {
        self.model.display_slots(self.aggregate.id)
    }

    /// Path from `from` to this aggregate.
    pub fn full_path(&self, from: AggregateId) -> Result<Path, UnreachableMember> {
        self.model.path_from(from, self.aggregate.id)
    }

    /// Path from this aggregate's root.
    pub fn root_path(&self) -> Result<Path, UnreachableMember> {
        self.full_path(self.model.schema.root_of(self.aggregate.id))
    }
}
