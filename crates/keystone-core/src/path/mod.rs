//! Entry-relative paths.
//!
//! A path leads from an entry aggregate to a target aggregate or member.
//! Targets inside the entry's ownership subtree are reached over owning
//! edges only; anything else is searched for breadth-first across reference
//! edges, expanding each reference target once.


use keystone_schema::prelude::*;
use std::{
    collections::{HashSet, VecDeque},
    fmt,
};
use thiserror::Error as ThisError;

///
/// UnreachableMember
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("'{target}' is not reachable from '{entry}'")]
pub struct UnreachableMember {
    pub entry: String,
    pub target: String,
}

///
/// PathTarget
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathTarget {
    Aggregate(AggregateId),
    Member(MemberId),
}

impl From<AggregateId> for PathTarget {
    fn from(id: AggregateId) -> Self {
        Self::Aggregate(id)
    }
}

impl From<MemberId> for PathTarget {
    fn from(id: MemberId) -> Self {
        Self::Member(id)
    }
}

///
/// SegmentKind
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SegmentKind {
    Child,

    /// Collection boundary: the path continues inside one item.
    Children,

    /// Variation slot; the following `Branch` segment picks the case.
    Variation,
    Branch {
        discriminator: String,
    },

    /// Crosses a reference edge into another tree or subtree.
    Reference,

    /// Final segment naming a scalar or reference member.
    Member,
}

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PathSegment {
    pub name: String,
    pub member: MemberId,

    /// Aggregate the segment lands in. `Member` and `Variation` segments stay
    /// in their owner.
    pub aggregate: AggregateId,
    pub kind: SegmentKind,
}

impl PathSegment {
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, SegmentKind::Children)
    }

    /// Whether following this segment arrives in `aggregate`.
    #[must_use]
    pub fn lands_in(&self, aggregate: AggregateId) -> bool {
        !matches!(self.kind, SegmentKind::Member | SegmentKind::Variation)
            && self.aggregate == aggregate
    }
}

///
/// Path
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Path {
    pub entry: AggregateId,
    pub segments: Vec<PathSegment>,
}

impl Path {
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Aggregate the path ends in (the entry for an empty path).
    #[must_use]
    pub fn end(&self) -> AggregateId {
        self.last().map_or(self.entry, |s| s.aggregate)
    }

    #[must_use]
    pub fn crosses_reference(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s.kind, SegmentKind::Reference))
    }

    /// Number of collection boundaries crossed.
    #[must_use]
    pub fn collection_depth(&self) -> usize {
        self.segments.iter().filter(|s| s.is_collection()).count()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.name.as_str()).collect()
    }

    /// The remainder after the last segment landing in `aggregate`. The
    /// whole path when it never lands there.
    #[must_use]
    pub fn since(&self, aggregate: AggregateId) -> Self {
        match self.segments.iter().rposition(|s| s.lands_in(aggregate)) {
            Some(index) => Self {
                entry: aggregate,
                segments: self.segments[index + 1..].to_vec(),
            },
            None => self.clone(),
        }
    }

    /// The prefix up to and including the first segment landing in
    /// `aggregate`. Empty when `aggregate` is the entry.
    #[must_use]
    pub fn until(&self, aggregate: AggregateId) -> Self {
        if aggregate == self.entry {
            return Self {
                entry: self.entry,
                segments: Vec::new(),
            };
        }

        let end = self
            .segments
            .iter()
            .position(|s| s.lands_in(aggregate))
            .map_or(self.segments.len(), |index| index + 1);

        Self {
            entry: self.entry,
            segments: self.segments[..end].to_vec(),
        }
    }
}

impl fmt::Display for Path {
    // `lines[].product->title`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&SegmentKind> = None;

        for segment in &self.segments {
            match previous {
                None => {}
                Some(SegmentKind::Reference) => f.write_str("->")?,
                Some(_) => f.write_str(".")?,
            }
            f.write_str(&segment.name)?;
            if segment.is_collection() {
                f.write_str("[]")?;
            }
            previous = Some(&segment.kind);
        }

        Ok(())
    }
}

/// Path from `entry` to `target`.
pub fn path_from(
    schema: &Schema,
    entry: AggregateId,
    target: impl Into<PathTarget>,
) -> Result<Path, UnreachableMember> {
    let target = target.into();

    let (aggregate, terminal) = match target {
        PathTarget::Aggregate(id) => (id, None),
        PathTarget::Member(id) => {
            let member = schema.member(id);
            (member.owner, Some(member_segment(member)))
        }
    };

    let mut segments = owning_path(schema, entry, aggregate)
        .or_else(|| through_reference(schema, entry, aggregate))
        .ok_or_else(|| UnreachableMember {
            entry: schema.aggregate(entry).route.clone(),
            target: match target {
                PathTarget::Aggregate(id) => schema.aggregate(id).route.clone(),
                PathTarget::Member(id) => schema.member(id).route.clone(),
            },
        })?;
    segments.extend(terminal);

    Ok(Path { entry, segments })
}

// Walk up owning edges from `target`; `None` when `entry` is never passed.
fn owning_path(
    schema: &Schema,
    entry: AggregateId,
    target: AggregateId,
) -> Option<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut current = target;

    while current != entry {
        let edge = schema.aggregate(current).owner?;
        push_owner_segments(schema, current, edge, &mut segments);
        current = edge.parent;
    }
    segments.reverse();

    Some(segments)
}

fn through_reference(
    schema: &Schema,
    entry: AggregateId,
    target: AggregateId,
) -> Option<Vec<PathSegment>> {
    let mut queue = VecDeque::from([(entry, Vec::new())]);
    let mut expanded = HashSet::from([entry]);

    while let Some((base, prefix)) = queue.pop_front() {
        for holder in std::iter::once(base).chain(schema.descendants(base)) {
            for member in schema.members(holder) {
                let MemberKind::Reference(reference) = &member.kind else {
                    continue;
                };

                let mut crossing = prefix.clone();
                crossing.extend(owning_path(schema, base, holder).unwrap_or_default());
                crossing.push(PathSegment {
                    name: member.name.clone(),
                    member: member.id,
                    aggregate: reference.target,
                    kind: SegmentKind::Reference,
                });

                if let Some(rest) = owning_path(schema, reference.target, target) {
                    crossing.extend(rest);
                    return Some(crossing);
                }
                if expanded.insert(reference.target) {
                    queue.push_back((reference.target, crossing));
                }
            }
        }
    }

    None
}

// Pushed innermost first; a branch is preceded by its variation slot.
fn push_owner_segments(
    schema: &Schema,
    aggregate: AggregateId,
    edge: OwnerEdge,
    segments: &mut Vec<PathSegment>,
) {
    let owned = schema.aggregate(aggregate);
    let member = schema.member(edge.member);

    let (name, kind) = match &member.kind {
        MemberKind::Children { .. } => (member.name.clone(), SegmentKind::Children),
        MemberKind::Variation(_) => {
            let kind = match &owned.role {
                Role::VariationBranch { discriminator } => SegmentKind::Branch {
                    discriminator: discriminator.clone(),
                },
                Role::Root | Role::Child | Role::Children => SegmentKind::Child,
            };
            segments.push(PathSegment {
                name: owned.physical_name.clone(),
                member: edge.member,
                aggregate,
                kind,
            });

            (member.name.clone(), SegmentKind::Variation)
        }
        MemberKind::Child { .. } | MemberKind::Value(_) | MemberKind::Reference(_) => {
            (member.name.clone(), SegmentKind::Child)
        }
    };

    let lands = if matches!(kind, SegmentKind::Variation) {
        edge.parent
    } else {
        aggregate
    };
    segments.push(PathSegment {
        name,
        member: edge.member,
        aggregate: lands,
        kind,
    });
}

fn member_segment(member: &Member) -> PathSegment {
    let (aggregate, kind) = match &member.kind {
        MemberKind::Child { child } => (*child, SegmentKind::Child),
        MemberKind::Children { child } => (*child, SegmentKind::Children),
        MemberKind::Value(_) | MemberKind::Variation(_) | MemberKind::Reference(_) => {
            (member.owner, SegmentKind::Member)
        }
    };

    PathSegment {
        name: member.name.clone(),
        member: member.id,
        aggregate,
        kind,
    }
}
