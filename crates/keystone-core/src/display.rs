//! Display-name slots.
//!
//! The scalars a UI shows as an instance's name: the owner's display slots,
//! own display-marked values and variations, then the display slots of each
//! display-marked reference target.

use crate::key::{EffectiveKey, PARENT_HOP, SlotOrigin, is_inherited};
use keystone_schema::prelude::*;
use std::collections::HashSet;

///
/// DisplaySlot
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DisplaySlot {
    pub origin: SlotOrigin,
    pub via: Vec<String>,
    pub name: String,
    pub primitive: Primitive,
}

impl DisplaySlot {
    #[must_use]
    pub fn source_path(&self) -> String {
        let mut parts = self.via.clone();
        parts.push(self.name.clone());

        parts.join(".")
    }
}

/// Display slots of `id`; falls back to the effective key when none are
/// declared and `key_fallback` is set.
#[must_use]
pub fn display_slots(
    schema: &Schema,
    id: AggregateId,
    key: &EffectiveKey,
    key_fallback: bool,
) -> Vec<DisplaySlot> {
    let mut slots = Vec::new();
    collect(schema, id, &[], &mut Vec::new(), &mut slots);

    // same collapse rule as effective keys
    let inherited: HashSet<SlotOrigin> = slots
        .iter()
        .filter(|slot| is_inherited(&slot.via))
        .map(|slot| slot.origin)
        .collect();
    let mut paths = HashSet::new();
    slots.retain(|slot| {
        (is_inherited(&slot.via) || !inherited.contains(&slot.origin))
            && paths.insert(slot.source_path())
    });

    if slots.is_empty() && key_fallback {
        return key
            .iter()
            .map(|slot| DisplaySlot {
                origin: slot.origin,
                via: slot.via.clone(),
                name: slot.name.clone(),
                primitive: slot.primitive,
            })
            .collect();
    }

    slots
}

fn collect(
    schema: &Schema,
    id: AggregateId,
    via: &[String],
    visiting: &mut Vec<AggregateId>,
    out: &mut Vec<DisplaySlot>,
) {
    // reference cycles
    if visiting.contains(&id) {
        return;
    }
    visiting.push(id);

    if let Some(parent) = schema.parent(id) {
        collect(schema, parent, &extend(via, PARENT_HOP), visiting, out);
    }

    for member in schema.members(id) {
        match &member.kind {
            MemberKind::Value(value) if value.is_display_name => {
                out.push(declared(member, via, value.primitive));
            }
            MemberKind::Variation(variation) if variation.is_display_name => {
                out.push(declared(member, via, Primitive::Text));
            }
            MemberKind::Reference(reference) if reference.is_display_name => {
                collect(
                    schema,
                    reference.target,
                    &extend(via, &member.name),
                    visiting,
                    out,
                );
            }
            MemberKind::Value(_)
            | MemberKind::Variation(_)
            | MemberKind::Reference(_)
            | MemberKind::Child { .. }
            | MemberKind::Children { .. } => {}
        }
    }

    visiting.pop();
}

fn declared(member: &Member, via: &[String], primitive: Primitive) -> DisplaySlot {
    DisplaySlot {
        origin: SlotOrigin {
            aggregate: member.owner,
            member: member.id,
        },
        via: via.to_vec(),
        name: member.name.clone(),
        primitive,
    }
}

fn extend(via: &[String], hop: &str) -> Vec<String> {
    let mut out = via.to_vec();
    out.push(hop.to_string());

    out
}

///
/// TESTS
///
