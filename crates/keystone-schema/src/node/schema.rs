use crate::{
    REF_TARGET_PREFIX,
    node::{Aggregate, AggregateId, Member, MemberId},
};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// Schema
///
/// Immutable arena of aggregates and members. All edges are id pairs.
/// Ids are only minted by the builder for this arena, so indexing by an
/// id taken from the same schema cannot fail.
///

#[derive(Clone, Debug, Serialize)]
pub struct Schema {
    aggregates: Vec<Aggregate>,
    members: Vec<Member>,
    roots: Vec<AggregateId>,

    #[serde(skip)]
    routes: BTreeMap<String, AggregateId>,

    #[serde(skip)]
    referrers: Vec<Vec<MemberId>>,
}

impl Schema {
    pub(crate) fn from_parts(
        aggregates: Vec<Aggregate>,
        members: Vec<Member>,
        roots: Vec<AggregateId>,
    ) -> Self {
        let routes = aggregates
            .iter()
            .map(|a| (a.route.clone(), a.id))
            .collect();

        let mut referrers = vec![Vec::new(); aggregates.len()];
        for member in &members {
            if let Some(r) = member.as_reference() {
                referrers[r.target.index()].push(member.id);
            }
        }

        Self {
            aggregates,
            members,
            roots,
            routes,
            referrers,
        }
    }

    /// Root aggregates in declaration order.
    #[must_use]
    pub fn roots(&self) -> &[AggregateId] {
        &self.roots
    }

    #[must_use]
    pub fn aggregate(&self, id: AggregateId) -> &Aggregate {
        &self.aggregates[id.index()]
    }

    #[must_use]
    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    pub fn aggregates(&self) -> impl Iterator<Item = &Aggregate> {
        self.aggregates.iter()
    }

    /// Members of one aggregate in declaration order.
    pub fn members(&self, id: AggregateId) -> impl Iterator<Item = &Member> {
        self.aggregate(id)
            .members
            .iter()
            .map(|member| self.member(*member))
    }

    /// Find a member of an aggregate by name.
    #[must_use]
    pub fn find_member(&self, id: AggregateId, name: &str) -> Option<&Member> {
        self.members(id).find(|m| m.name == name)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.aggregates.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Resolve an aggregate by route (`Root/child/...`), accepting the `ref-to:` prefix.
    #[must_use]
    pub fn find(&self, route: &str) -> Option<AggregateId> {
        let route = route.strip_prefix(REF_TARGET_PREFIX).unwrap_or(route);

        self.routes.get(route).copied()
    }

    #[must_use]
    pub fn parent(&self, id: AggregateId) -> Option<AggregateId> {
        self.aggregate(id).parent()
    }

    /// Ancestors of an aggregate, root first, excluding the aggregate itself.
    #[must_use]
    pub fn ancestors(&self, id: AggregateId) -> Vec<AggregateId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);

        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out.reverse();

        out
    }

    #[must_use]
    pub fn root_of(&self, id: AggregateId) -> AggregateId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }

        current
    }

    /// Number of owning edges between the aggregate and its root.
    #[must_use]
    pub fn depth(&self, id: AggregateId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }

        depth
    }

    /// Whether `ancestor` is `id` or one of its owners.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: AggregateId, id: AggregateId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }

        false
    }

    /// Whether two aggregates belong to the same ownership tree.
    #[must_use]
    pub fn is_in_tree_of(&self, a: AggregateId, b: AggregateId) -> bool {
        self.root_of(a) == self.root_of(b)
    }

    /// Aggregates owned directly by `id`, in member declaration order.
    #[must_use]
    pub fn owned(&self, id: AggregateId) -> Vec<AggregateId> {
        self.members(id).flat_map(Member::owned).collect()
    }

    /// Pre-order walk of the ownership subtree below `id`, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: AggregateId) -> Vec<AggregateId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);

        out
    }

    fn collect_descendants(&self, id: AggregateId, out: &mut Vec<AggregateId>) {
        for child in self.owned(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Reference members, anywhere in the schema, that point at `id`.
    #[must_use]
    pub fn referrers(&self, id: AggregateId) -> &[MemberId] {
        &self.referrers[id.index()]
    }
}
