//! Effective key resolution.
//!
//! An aggregate's effective key is the ordered list of scalar slots that
//! identify one of its instances: the owner's key (for non-roots), then its
//! own key members in declaration order, with key references expanded in
//! place into the target's effective key.


use crate::instance::{InstanceKey, KeyShape, KeyTag, KeyValue};
use keystone_schema::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error as ThisError;

pub use keystone_schema::PARENT_HOP;

///
/// KeyError
///
/// `EmptyEffectiveKey` and `UnsupportedKeyType` back up the schema
/// builder's key checks for schemas assembled without it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("cyclic key dependency: {}", .chain.join(" -> "))]
    CyclicKeyDependency { chain: Vec<String> },

    #[error("aggregate '{route}' has an empty effective key")]
    EmptyEffectiveKey { route: String },

    #[error("key member '{route}' of type {primitive} has no key representation")]
    UnsupportedKeyType { route: String, primitive: Primitive },
}

///
/// SlotOrigin
/// The declaring aggregate and member of a key slot.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct SlotOrigin {
    pub aggregate: AggregateId,
    pub member: MemberId,
}

///
/// KeySlot
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KeySlot {
    pub origin: SlotOrigin,

    /// Relation hops from the keyed aggregate to the declaring one.
    pub via: Vec<String>,

    /// Declared member name.
    pub name: String,
    pub primitive: Primitive,
    pub tag: KeyTag,
}

impl KeySlot {
    /// Member path from the keyed aggregate (`parent.id`, `product.sku`).
    #[must_use]
    pub fn source_path(&self) -> String {
        self.via
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `Declaring.member`, the name a reader of the schema would use.
    #[must_use]
    pub fn qualified_name(&self, schema: &Schema) -> String {
        format!(
            "{}.{}",
            schema.aggregate(self.origin.aggregate).physical_name,
            self.name
        )
    }

    /// Whether the slot comes from an ancestor over ownership hops only.
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        is_inherited(&self.via)
    }

    fn hop(mut self, name: &str) -> Self {
        self.via.insert(0, name.to_string());
        self
    }
}

///
/// EffectiveKey
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EffectiveKey {
    slots: Vec<KeySlot>,
}

impl EffectiveKey {
    #[must_use]
    pub fn slots(&self) -> &[KeySlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeySlot> {
        self.slots.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn shape(&self) -> KeyShape {
        KeyShape::new(self.slots.iter().map(|slot| slot.tag).collect())
    }

    /// Collect an instance key from a populated instance, one value per slot.
    /// `source` is asked for every slot in key order.
    pub fn instance_key(
        &self,
        mut source: impl FnMut(&KeySlot) -> Option<KeyValue>,
    ) -> Result<InstanceKey, MissingKeyValue> {
        let mut values = Vec::with_capacity(self.slots.len());

        for (index, slot) in self.slots.iter().enumerate() {
            let value = source(slot)
                .filter(|value| value.tag() == slot.tag)
                .ok_or_else(|| MissingKeyValue {
                    slot: index,
                    path: slot.source_path(),
                    expected: slot.tag,
                })?;

            values.push(value);
        }

        Ok(InstanceKey::new(values))
    }
}

///
/// MissingKeyValue
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("key slot {slot} ('{path}') needs a {expected} value")]
pub struct MissingKeyValue {
    pub slot: usize,
    pub path: String,
    pub expected: KeyTag,
}

///
/// KeyResolver
///
/// Memoized over one schema. Failures are memoized too, so a broken key is
/// reported once per aggregate that depends on it.
///

pub struct KeyResolver<'a> {
    schema: &'a Schema,
    memo: Vec<Option<Result<EffectiveKey, KeyError>>>,
    in_progress: Vec<AggregateId>,
}

impl<'a> KeyResolver<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            memo: vec![None; schema.len()],
            in_progress: Vec::new(),
        }
    }

    /// Resolve every aggregate, in arena order, collecting all failures.
    pub fn resolve_all(schema: &'a Schema) -> Result<Vec<EffectiveKey>, Vec<KeyError>> {
        let mut resolver = Self::new(schema);
        let mut keys = Vec::with_capacity(schema.len());
        let mut errors = Vec::new();

        for aggregate in schema.aggregates() {
            match resolver.effective_key(aggregate.id) {
                Ok(key) => keys.push(key),
                Err(err) => {
                    if !errors.contains(&err) {
                        errors.push(err);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(keys)
        } else {
            Err(errors)
        }
    }

    pub fn effective_key(&mut self, id: AggregateId) -> Result<EffectiveKey, KeyError> {
        if let Some(done) = &self.memo[id.index()] {
            return done.clone();
        }

        self.in_progress.push(id);
        let result = self.compute(id);
        self.in_progress.pop();

        if let Ok(key) = &result {
            let aggregate = self.schema.aggregate(id);
            tracing::trace!(
                route = %aggregate.route,
                slots = key.len(),
                "resolved effective key"
            );
        }
        self.memo[id.index()] = Some(result.clone());

        result
    }

    fn compute(&mut self, id: AggregateId) -> Result<EffectiveKey, KeyError> {
        let schema = self.schema;
        let aggregate = schema.aggregate(id);
        let mut slots = Vec::new();

        if let Some(parent) = aggregate.parent() {
            let inherited = self.enter(parent)?;
            slots.extend(inherited.slots.into_iter().map(|s| s.hop(PARENT_HOP)));
        }

        for member in schema.members(id) {
            match &member.kind {
                MemberKind::Value(value) => {
                    if value.is_key {
                        slots.push(declared_slot(member, value.primitive)?);
                    }
                }
                MemberKind::Variation(variation) => {
                    if variation.is_key {
                        slots.push(declared_slot(member, Primitive::Text)?);
                    }
                }
                MemberKind::Reference(reference) => {
                    if reference.is_key {
                        let target = self.enter(reference.target)?;
                        slots.extend(target.slots.into_iter().map(|s| s.hop(&member.name)));
                    }
                }
                MemberKind::Child { .. } | MemberKind::Children { .. } => {}
            }
        }

        let slots = collapse_duplicates(&aggregate.route, slots);
        if slots.is_empty() {
            return Err(KeyError::EmptyEffectiveKey {
                route: aggregate.route.clone(),
            });
        }

        Ok(EffectiveKey { slots })
    }

    // an aggregate already on the stack closes a cycle
    fn enter(&mut self, target: AggregateId) -> Result<EffectiveKey, KeyError> {
        if let Some(start) = self.in_progress.iter().position(|&a| a == target) {
            let chain = self.in_progress[start..]
                .iter()
                .chain(std::iter::once(&target))
                .map(|&a| self.schema.aggregate(a).route.clone())
                .collect();

            return Err(KeyError::CyclicKeyDependency { chain });
        }

        self.effective_key(target)
    }
}

pub(crate) fn is_inherited(via: &[String]) -> bool {
    !via.is_empty() && via.iter().all(|hop| hop == PARENT_HOP)
}

fn declared_slot(member: &Member, primitive: Primitive) -> Result<KeySlot, KeyError> {
    let tag = KeyTag::of(primitive).ok_or_else(|| KeyError::UnsupportedKeyType {
        route: member.route.clone(),
        primitive,
    })?;

    Ok(KeySlot {
        origin: SlotOrigin {
            aggregate: member.owner,
            member: member.id,
        },
        via: Vec::new(),
        name: member.name.clone(),
        primitive,
        tag,
    })
}

// A reference slot re-deriving an inherited ancestor slot collapses into it,
// as does any slot repeating an earlier source path. Separate reference
// chains to the same target stay separate.
fn collapse_duplicates(route: &str, slots: Vec<KeySlot>) -> Vec<KeySlot> {
    let inherited: HashSet<SlotOrigin> = slots
        .iter()
        .filter(|slot| slot.is_inherited())
        .map(|slot| slot.origin)
        .collect();
    let mut paths = HashSet::new();
    let mut out = Vec::with_capacity(slots.len());

    for slot in slots {
        let path = slot.source_path();
        let rederived = !slot.is_inherited() && inherited.contains(&slot.origin);

        if rederived || !paths.insert(path) {
            tracing::warn!(
                route,
                slot = %slot.source_path(),
                "key slot collapsed into an earlier slot"
            );
        } else {
            out.push(slot);
        }
    }

    out
}
