//! Member classification.
//!
//! Decides the member kind of one node from its relation marker, its
//! options, and the shape of the nodes it owns.

use crate::{
    PARENT_HOP,
    build::Intake,
    error::{ErrorTree, SchemaError},
    node::ValueMember,
    source::{NodeRecord, RelationKind, options},
    types::Primitive,
    violation,
};
use convert_case::{Case, Casing};
use std::collections::BTreeSet;

///
/// Flags
///

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Flags {
    pub is_key: bool,
    pub is_required: bool,
    pub is_display_name: bool,
}

///
/// MemberForm
/// Classification outcome before owned aggregates and references are built.
///

pub(crate) enum MemberForm {
    Value(ValueMember),
    Owned {
        many: bool,
    },
    Variation {
        discriminator: String,
        branches: Vec<(String, usize)>,
        flags: Flags,
    },
    Reference {
        target: String,
        flags: Flags,
    },
}

impl MemberForm {
    pub(crate) const fn is_key(&self) -> bool {
        match self {
            Self::Value(v) => v.is_key,
            Self::Variation { flags, .. } | Self::Reference { flags, .. } => flags.is_key,
            Self::Owned { .. } => false,
        }
    }
}

/// Classify the member node at `node`, recording every violation found.
/// Returns `None` when the node cannot become a member.
pub(crate) fn classify(intake: &Intake, node: usize, errs: &mut ErrorTree) -> Option<MemberForm> {
    let record = &intake.records[node];
    let route = intake.routes[node].as_str();
    let owned = &intake.children[node];

    let flags = parse_flags(record, route, errs)?;

    match &record.relation {
        Some(RelationKind::Child | RelationKind::Children) => {
            if flags.is_key {
                violation!(
                    errs,
                    route,
                    "owned aggregate '{}' cannot be marked as a key",
                    record.physical_name
                );
                return None;
            }

            Some(MemberForm::Owned {
                many: matches!(record.relation, Some(RelationKind::Children)),
            })
        }

        Some(RelationKind::Reference) => {
            if !owned.is_empty() {
                errs.add(SchemaError::malformed(
                    route,
                    format!(
                        "reference member '{}' cannot own nodes",
                        record.physical_name
                    ),
                ));
                return None;
            }

            if record.physical_name == PARENT_HOP {
                violation!(errs, route, "reference member cannot be named '{PARENT_HOP}'");
                return None;
            }

            match record.option(options::REF_TO).map(str::trim) {
                Some(target) if !target.is_empty() => Some(MemberForm::Reference {
                    target: target.to_string(),
                    flags,
                }),
                _ => {
                    violation!(
                        errs,
                        route,
                        "reference member '{}' declares no '{}' target",
                        record.physical_name,
                        options::REF_TO
                    );
                    None
                }
            }
        }

        Some(RelationKind::VariationBranch(_)) => {
            violation!(
                errs,
                route,
                "variation branch '{}' must be declared inside a variation member",
                record.physical_name
            );
            None
        }

        None => {
            let is_variation = parse_bool(record, options::VARIATION, route, errs)?;
            if is_variation {
                classify_variation(intake, node, flags, errs)
            } else {
                classify_value(intake, node, flags, errs)
            }
        }
    }
}

// An open slot: every owned node must be a typed branch and there must be at least two.
fn classify_variation(
    intake: &Intake,
    node: usize,
    flags: Flags,
    errs: &mut ErrorTree,
) -> Option<MemberForm> {
    let record = &intake.records[node];
    let route = intake.routes[node].as_str();
    let before = errs.len();

    let mut branches = Vec::new();
    let mut values = BTreeSet::new();
    let mut names = BTreeSet::new();

    for &child in &intake.children[node] {
        let branch = &intake.records[child];
        let branch_route = intake.routes[child].as_str();

        let Some(RelationKind::VariationBranch(value)) = &branch.relation else {
            violation!(
                errs,
                branch_route,
                "variation member '{}' may only own branches; '{}' is not a branch",
                record.physical_name,
                branch.physical_name
            );
            continue;
        };

        if !names.insert(branch.physical_name.as_str()) {
            errs.add(SchemaError::DuplicateName {
                route: branch_route.to_string(),
                name: branch.physical_name.clone(),
            });
            continue;
        }
        if !values.insert(value.as_str()) {
            violation!(
                errs,
                branch_route,
                "variation member '{}' declares discriminator value '{value}' more than once",
                record.physical_name
            );
            continue;
        }

        branches.push((value.clone(), child));
    }

    if branches.len() < 2 {
        violation!(
            errs,
            route,
            "variation member '{}' declares {} branch(es); at least 2 are required",
            record.physical_name,
            branches.len()
        );
    }

    if errs.len() > before {
        return None;
    }

    let discriminator = record
        .option(options::DISCRIMINATOR)
        .unwrap_or(record.physical_name.as_str())
        .to_string();

    Some(MemberForm::Variation {
        discriminator,
        branches,
        flags,
    })
}

// A concrete slot: a scalar leaf that owns nothing.
fn classify_value(
    intake: &Intake,
    node: usize,
    flags: Flags,
    errs: &mut ErrorTree,
) -> Option<MemberForm> {
    let record = &intake.records[node];
    let route = intake.routes[node].as_str();
    let owned = &intake.children[node];

    let branch_count = owned
        .iter()
        .filter(|&&c| {
            matches!(
                intake.records[c].relation,
                Some(RelationKind::VariationBranch(_))
            )
        })
        .count();

    if branch_count > 0 {
        violation!(
            errs,
            route,
            "member '{}' is not declared as a variation but owns {branch_count} variation branch(es)",
            record.physical_name
        );
        return None;
    }
    if !owned.is_empty() {
        errs.add(SchemaError::malformed(
            route,
            format!("value member '{}' cannot own nodes", record.physical_name),
        ));
        return None;
    }

    let Some(raw) = record.option(options::SCALAR_TYPE) else {
        violation!(
            errs,
            route,
            "value member '{}' declares no '{}'",
            record.physical_name,
            options::SCALAR_TYPE
        );
        return None;
    };
    let Ok(primitive) = raw.trim().parse::<Primitive>() else {
        violation!(
            errs,
            route,
            "value member '{}' has unknown scalar type '{raw}'",
            record.physical_name
        );
        return None;
    };

    if flags.is_key && !primitive.supports_key() {
        violation!(
            errs,
            route,
            "value member '{}' of type {primitive} cannot be a key",
            record.physical_name
        );
        return None;
    }

    Some(MemberForm::Value(ValueMember {
        primitive,
        is_key: flags.is_key,
        // keys are always required
        is_required: flags.is_required || flags.is_key,
        is_display_name: flags.is_display_name,
        db_name: db_name(record),
    }))
}

/// Stored name of a node: the `db_name` option or the snake_case physical name.
pub(crate) fn db_name(record: &NodeRecord) -> String {
    record.option(options::DB_NAME).map_or_else(
        || record.physical_name.to_case(Case::Snake),
        str::to_string,
    )
}

fn parse_flags(record: &NodeRecord, route: &str, errs: &mut ErrorTree) -> Option<Flags> {
    let is_key = parse_bool(record, options::IS_KEY, route, errs);
    let is_required = parse_bool(record, options::IS_REQUIRED, route, errs);
    let is_display_name = parse_bool(record, options::IS_DISPLAY_NAME, route, errs);

    Some(Flags {
        is_key: is_key?,
        is_required: is_required?,
        is_display_name: is_display_name?,
    })
}

// absent means false
fn parse_bool(record: &NodeRecord, key: &str, route: &str, errs: &mut ErrorTree) -> Option<bool> {
    match record.option(key).map(str::trim) {
        None => Some(false),
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            violation!(
                errs,
                route,
                "option '{key}' of '{}' must be 'true' or 'false', got '{other}'",
                record.physical_name
            );
            None
        }
    }
}
