use crate::{Artifact, EmitError, Emitter};
use keystone_core::{
    Model,
    model::{AggregateView, ResolvedMember},
};
use serde::Serialize;

/// Default artifact path of the manifest.
pub const MANIFEST_PATH: &str = "manifest.json";

///
/// ManifestEmitter
///
/// Writes one JSON document describing every aggregate in walk order: role,
/// storage name, effective key, display slots, members and root path.
///

#[derive(Clone, Debug)]
pub struct ManifestEmitter {
    path: String,
}

impl ManifestEmitter {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ManifestEmitter {
    fn default() -> Self {
        Self::new(MANIFEST_PATH)
    }
}

impl Emitter for ManifestEmitter {
    fn name(&self) -> &str {
        "manifest"
    }

    fn emit(&self, model: &Model) -> Result<Vec<Artifact>, EmitError> {
        let aggregates = model
            .walk()
            .map(|view| AggregateEntry::from_view(&view))
            .collect::<Result<Vec<_>, _>>()?;

        let contents = serde_json::to_string_pretty(&Manifest { aggregates })?;

        Ok(vec![Artifact::new(self.path.clone(), contents)])
    }
}

#[derive(Serialize)]
struct Manifest {
    aggregates: Vec<AggregateEntry>,
}

#[derive(Serialize)]
struct AggregateEntry {
    route: String,
    name: String,
    display_name: String,
    db_name: String,
    role: &'static str,
    depth: usize,
    root_path: String,
    key: Vec<SlotEntry>,
    display: Vec<SlotEntry>,
    members: Vec<MemberEntry>,
}

impl AggregateEntry {
    fn from_view(view: &AggregateView<'_>) -> Result<Self, EmitError> {
        let aggregate = view.aggregate;

        Ok(Self {
            route: aggregate.route.clone(),
            name: aggregate.physical_name.clone(),
            display_name: aggregate.display_name.clone(),
            db_name: aggregate.db_name.clone(),
            role: aggregate.role.label(),
            depth: view.depth,
            root_path: view.root_path()?.to_string(),
            key: view
                .effective_key
                .iter()
                .map(|slot| SlotEntry {
                    path: slot.source_path(),
                    primitive: slot.primitive.to_string(),
                })
                .collect(),
            display: view
                .display_slots()
                .iter()
                .map(|slot| SlotEntry {
                    path: slot.source_path(),
                    primitive: slot.primitive.to_string(),
                })
                .collect(),
            members: view.members.iter().map(MemberEntry::from_resolved).collect(),
        })
    }
}

#[derive(Serialize)]
struct SlotEntry {
    path: String,
    primitive: String,
}

#[derive(Serialize)]
struct MemberEntry {
    name: String,
    kind: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    primitive: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    target_key: Option<Vec<String>>,
}

impl MemberEntry {
    fn from_resolved(resolved: &ResolvedMember<'_>) -> Self {
        let member = resolved.member();
        let (primitive, target_key) = match resolved {
            ResolvedMember::Value { value, .. } => (Some(value.primitive.to_string()), None),
            ResolvedMember::Reference { target_key, .. } => (
                None,
                Some(target_key.tags().iter().map(ToString::to_string).collect()),
            ),
            ResolvedMember::Child { .. }
            | ResolvedMember::Children { .. }
            | ResolvedMember::Variation { .. } => (None, None),
        };

        Self {
            name: member.name.clone(),
            kind: member.kind_label(),
            primitive,
            target_key,
        }
    }
}
