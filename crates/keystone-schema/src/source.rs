//! Node/attribute source contract.
//!
//! A source translates some concrete declaration syntax into an ordered,
//! syntax-neutral stream of [`NodeRecord`]s. Parents must precede their
//! children in the stream.

use crate::types::Primitive;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Option keys
///

pub mod options {
    pub const IS_KEY: &str = "is_key";
    pub const IS_REQUIRED: &str = "is_required";
    pub const IS_DISPLAY_NAME: &str = "is_display_name";
    pub const SCALAR_TYPE: &str = "scalar_type";
    pub const REF_TO: &str = "ref_to";
    pub const VARIATION: &str = "variation";
    pub const DISCRIMINATOR: &str = "discriminator";
    pub const DB_NAME: &str = "db_name";
}

///
/// NodeId
/// Source-assigned node identity, unique within one stream.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("#{_0}")]
pub struct NodeId(pub u32);

///
/// RelationKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RelationKind {
    Child,
    Children,
    VariationBranch(String),
    Reference,
}

///
/// NodeRecord
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub physical_name: String,
    pub display_name: String,
    pub parent: Option<NodeId>,
    pub relation: Option<RelationKind>,

    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl NodeRecord {
    /// A parentless record; the display name defaults to the physical name.
    #[must_use]
    pub fn new(id: u32, physical_name: &str) -> Self {
        Self {
            id: NodeId(id),
            physical_name: physical_name.to_string(),
            display_name: physical_name.to_string(),
            parent: None,
            relation: None,
            options: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn root(id: u32, physical_name: &str) -> Self {
        Self::new(id, physical_name)
    }

    #[must_use]
    pub fn value(id: u32, parent: u32, physical_name: &str, primitive: Primitive) -> Self {
        Self::new(id, physical_name)
            .with_parent(parent)
            .with_option(options::SCALAR_TYPE, &primitive.to_string())
    }

    #[must_use]
    pub fn child(id: u32, parent: u32, physical_name: &str) -> Self {
        Self::new(id, physical_name)
            .with_parent(parent)
            .with_relation(RelationKind::Child)
    }

    #[must_use]
    pub fn children(id: u32, parent: u32, physical_name: &str) -> Self {
        Self::new(id, physical_name)
            .with_parent(parent)
            .with_relation(RelationKind::Children)
    }

    #[must_use]
    pub fn reference(id: u32, parent: u32, physical_name: &str, target: &str) -> Self {
        Self::new(id, physical_name)
            .with_parent(parent)
            .with_relation(RelationKind::Reference)
            .with_option(options::REF_TO, target)
    }

    #[must_use]
    pub fn variation(id: u32, parent: u32, physical_name: &str) -> Self {
        Self::new(id, physical_name)
            .with_parent(parent)
            .with_option(options::VARIATION, "true")
    }

    #[must_use]
    pub fn branch(id: u32, variation: u32, physical_name: &str, discriminator: &str) -> Self {
        Self::new(id, physical_name)
            .with_parent(variation)
            .with_relation(RelationKind::VariationBranch(discriminator.to_string()))
    }

    #[must_use]
    pub const fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(NodeId(parent));
        self
    }

    #[must_use]
    pub fn with_relation(mut self, relation: RelationKind) -> Self {
        self.relation = Some(relation);
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn key(self) -> Self {
        self.with_option(options::IS_KEY, "true")
    }

    #[must_use]
    pub fn required(self) -> Self {
        self.with_option(options::IS_REQUIRED, "true")
    }

    #[must_use]
    pub fn display(self) -> Self {
        self.with_option(options::IS_DISPLAY_NAME, "true")
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}
