//! Schema graph construction.
//!
//! Turns an ordered node stream into the immutable [`Schema`] arena in
//! three passes: intake (parent linkage), arena (classification and the
//! ownership forest), binding (reference targets). Every pass keeps going
//! after an error so one run reports as much as possible.

mod classify;
mod naming;

#[cfg(test)]
mod tests;

use crate::{
    ROUTE_SEPARATOR,
    build::classify::{MemberForm, classify, db_name},
    error::{ErrorTree, SchemaError},
    node::{
        Aggregate, AggregateId, Member, MemberId, MemberKind, OwnerEdge, ReferenceMember, Schema,
        VariationBranch, VariationMember,
    },
    source::{NodeId, NodeRecord},
    types::Role,
    violation,
};
use keystone_config::{GeneratorConfig, NamingConfig};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("schema validation failed:\n{0}")]
    Validation(ErrorTree),
}

impl BuildError {
    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        match self {
            Self::Validation(errs) => errs,
        }
    }
}

///
/// SchemaBuilder
///

#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    naming: NamingConfig,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            naming: config.naming.clone(),
        }
    }

    /// Build the schema from an ordered node stream.
    pub fn build(
        &self,
        records: impl IntoIterator<Item = NodeRecord>,
    ) -> Result<Schema, BuildError> {
        let mut errs = ErrorTree::new();

        // Phase 1: link every record to an already-seen parent.
        let intake = Intake::collect(records, &mut errs);

        // Phase 2: classify members and grow the ownership forest.
        let mut arena = Arena::new(&intake, &self.naming);
        arena.build_roots(&mut errs);

        // Phase 3: bind reference targets now that every aggregate exists.
        arena.bind_references(&mut errs);

        if !errs.is_empty() {
            tracing::debug!(
                records = intake.records.len(),
                errors = errs.len(),
                "schema build failed"
            );
            return Err(BuildError::Validation(errs));
        }

        let schema = arena.finish().map_err(BuildError::Validation)?;
        tracing::debug!(
            records = intake.records.len(),
            aggregates = schema.len(),
            roots = schema.roots().len(),
            "schema built"
        );

        Ok(schema)
    }
}

///
/// Intake
/// Records in stream order with resolved parent linkage.
///

pub(crate) struct Intake {
    pub records: Vec<NodeRecord>,
    pub routes: Vec<String>,
    pub children: Vec<Vec<usize>>,
    pub roots: Vec<usize>,
}

impl Intake {
    fn collect(records: impl IntoIterator<Item = NodeRecord>, errs: &mut ErrorTree) -> Self {
        let mut intake = Self {
            records: Vec::new(),
            routes: Vec::new(),
            children: Vec::new(),
            roots: Vec::new(),
        };
        let mut index: HashMap<NodeId, usize> = HashMap::new();
        let mut rejected: HashSet<NodeId> = HashSet::new();

        for record in records {
            if index.contains_key(&record.id) || rejected.contains(&record.id) {
                errs.add(SchemaError::malformed(
                    record.physical_name.clone(),
                    format!("node id {} is declared more than once", record.id),
                ));
                continue;
            }

            let slot = intake.records.len();
            let route = match record.parent {
                None => {
                    intake.roots.push(slot);
                    record.physical_name.clone()
                }

                // descendants of a rejected node were already reported through it
                Some(parent) if rejected.contains(&parent) => {
                    rejected.insert(record.id);
                    continue;
                }

                Some(parent) => {
                    let Some(&parent_slot) = index.get(&parent) else {
                        errs.add(SchemaError::malformed(
                            record.physical_name.clone(),
                            format!(
                                "node {} references parent {parent} which has not been declared before it",
                                record.id
                            ),
                        ));
                        rejected.insert(record.id);
                        continue;
                    };

                    intake.children[parent_slot].push(slot);
                    format!(
                        "{}{ROUTE_SEPARATOR}{}",
                        intake.routes[parent_slot], record.physical_name
                    )
                }
            };

            index.insert(record.id, slot);
            intake.records.push(record);
            intake.routes.push(route);
            intake.children.push(Vec::new());
        }

        intake
    }
}

///
/// MemberDraft
/// A member whose kind may still wait on recursion or reference binding.
///

struct MemberDraft {
    id: MemberId,
    owner: AggregateId,
    name: String,
    display_name: String,
    route: String,
    kind: DraftKind,
}

enum DraftKind {
    Ready(MemberKind),
    Reference {
        target: String,
        is_key: bool,
        is_required: bool,
        is_display_name: bool,
    },
    Pending,
}

///
/// Arena
///

struct Arena<'a> {
    intake: &'a Intake,
    naming: &'a NamingConfig,
    aggregates: Vec<Aggregate>,
    members: Vec<MemberDraft>,
    roots: Vec<AggregateId>,
}

impl<'a> Arena<'a> {
    const fn new(intake: &'a Intake, naming: &'a NamingConfig) -> Self {
        Self {
            intake,
            naming,
            aggregates: Vec::new(),
            members: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn build_roots(&mut self, errs: &mut ErrorTree) {
        let mut names = BTreeSet::new();

        for &node in &self.intake.roots {
            let record = &self.intake.records[node];

            if record.relation.is_some() {
                errs.add(SchemaError::malformed(
                    record.physical_name.clone(),
                    format!(
                        "root node '{}' cannot declare a relation",
                        record.physical_name
                    ),
                ));
                continue;
            }
            if !names.insert(record.physical_name.as_str()) {
                errs.add(SchemaError::DuplicateName {
                    route: record.physical_name.clone(),
                    name: record.physical_name.clone(),
                });
                continue;
            }

            let id = self.build_aggregate(node, Role::Root, None, errs);
            self.roots.push(id);
        }
    }

    fn build_aggregate(
        &mut self,
        node: usize,
        role: Role,
        owner: Option<OwnerEdge>,
        errs: &mut ErrorTree,
    ) -> AggregateId {
        let intake = self.intake;
        let record = &intake.records[node];
        let route = &intake.routes[node];

        self.check_name(&record.physical_name, route, errs);

        let id = AggregateId(self.aggregates.len());
        self.aggregates.push(Aggregate {
            id,
            physical_name: record.physical_name.clone(),
            display_name: record.display_name.clone(),
            db_name: db_name(record),
            role: role.clone(),
            owner,
            members: Vec::new(),
            route: route.clone(),
        });

        // Phase 1: classify own members in declaration order.
        let mut names = BTreeSet::new();
        let mut has_key = false;
        let mut deferred = Vec::new();

        for &child in &intake.children[node] {
            let member_record = &intake.records[child];
            let member_route = &intake.routes[child];

            if !names.insert(member_record.physical_name.as_str()) {
                errs.add(SchemaError::DuplicateName {
                    route: member_route.clone(),
                    name: member_record.physical_name.clone(),
                });
                continue;
            }
            self.check_name(&member_record.physical_name, member_route, errs);

            let Some(form) = classify(intake, child, errs) else {
                continue;
            };
            has_key |= form.is_key();

            let member_id = MemberId(self.members.len());
            let kind = match form {
                MemberForm::Value(value) => DraftKind::Ready(MemberKind::Value(value)),
                MemberForm::Reference { target, flags } => DraftKind::Reference {
                    target,
                    is_key: flags.is_key,
                    is_required: flags.is_required || flags.is_key,
                    is_display_name: flags.is_display_name,
                },
                form @ (MemberForm::Owned { .. } | MemberForm::Variation { .. }) => {
                    deferred.push((member_id, child, form));
                    DraftKind::Pending
                }
            };

            self.members.push(MemberDraft {
                id: member_id,
                owner: id,
                name: member_record.physical_name.clone(),
                display_name: member_record.display_name.clone(),
                route: member_route.clone(),
                kind,
            });
            self.aggregates[id.index()].members.push(member_id);
        }

        // Phase 2: identity requirement, before descending.
        if role.requires_own_key() && !has_key {
            violation!(
                errs,
                route.as_str(),
                "{} aggregate '{}' declares no key member",
                role.label(),
                record.physical_name
            );
        }

        // Phase 3: build owned aggregates.
        for (member_id, child, form) in deferred {
            let edge = Some(OwnerEdge {
                parent: id,
                member: member_id,
            });

            let kind = match form {
                MemberForm::Owned { many } => {
                    let role = if many { Role::Children } else { Role::Child };
                    let child = self.build_aggregate(child, role, edge, errs);

                    if many {
                        MemberKind::Children { child }
                    } else {
                        MemberKind::Child { child }
                    }
                }
                MemberForm::Variation {
                    discriminator,
                    branches,
                    flags,
                } => {
                    let branches = branches
                        .into_iter()
                        .map(|(value, branch)| {
                            let role = Role::VariationBranch {
                                discriminator: value.clone(),
                            };
                            let aggregate = self.build_aggregate(branch, role, edge, errs);

                            VariationBranch { value, aggregate }
                        })
                        .collect();

                    MemberKind::Variation(VariationMember {
                        discriminator,
                        branches,
                        is_key: flags.is_key,
                        is_required: flags.is_required || flags.is_key,
                        is_display_name: flags.is_display_name,
                    })
                }
                MemberForm::Value(_) | MemberForm::Reference { .. } => continue,
            };

            self.members[member_id.index()].kind = DraftKind::Ready(kind);
        }

        id
    }

    fn check_name(&self, name: &str, route: &str, errs: &mut ErrorTree) {
        if let Err(message) = naming::validate_name(name, self.naming) {
            errs.add(SchemaError::violation(route, message));
        }
    }

    fn bind_references(&mut self, errs: &mut ErrorTree) {
        let routes: BTreeMap<&str, AggregateId> = self
            .aggregates
            .iter()
            .map(|a| (a.route.as_str(), a.id))
            .collect();

        for draft in &mut self.members {
            let DraftKind::Reference {
                target,
                is_key,
                is_required,
                is_display_name,
            } = &draft.kind
            else {
                continue;
            };

            let path = target
                .strip_prefix(crate::REF_TARGET_PREFIX)
                .unwrap_or(target);

            let Some(&resolved) = routes.get(path) else {
                errs.add(SchemaError::UnresolvedReferenceTarget {
                    route: draft.route.clone(),
                    target: target.clone(),
                });
                continue;
            };

            let reference = ReferenceMember {
                target: resolved,
                is_key: *is_key,
                is_required: *is_required,
                is_display_name: *is_display_name,
            };
            draft.kind = DraftKind::Ready(MemberKind::Reference(reference));
        }
    }

    fn finish(self) -> Result<Schema, ErrorTree> {
        let mut members = Vec::with_capacity(self.members.len());

        for draft in self.members {
            let DraftKind::Ready(kind) = draft.kind else {
                return Err(SchemaError::malformed(
                    draft.route,
                    "member kind was never resolved",
                )
                .into());
            };

            members.push(Member {
                id: draft.id,
                owner: draft.owner,
                name: draft.name,
                display_name: draft.display_name,
                route: draft.route,
                kind,
            });
        }

        Ok(Schema::from_parts(self.aggregates, members, self.roots))
    }
}
