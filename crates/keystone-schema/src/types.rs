use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// Primitive
///
/// Scalar type of a value member, parsed from the `scalar_type` option.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum Primitive {
    Bool,
    Date,
    Decimal,
    Float64,
    Int,
    Text,
    Timestamp,
    Uuid,
    YearMonth,
}

impl Primitive {
    // floats have no total order and no stable equality
    #[must_use]
    pub const fn supports_key(self) -> bool {
        !matches!(self, Self::Float64)
    }
}

///
/// Role
///
/// Position of an aggregate in its ownership tree.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Role {
    Root,
    Child,
    Children,
    VariationBranch { discriminator: String },
}

impl Role {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Roots and collection items have no owner-supplied identity of their own,
    /// so they must declare at least one key.
    #[must_use]
    pub const fn requires_own_key(&self) -> bool {
        matches!(self, Self::Root | Self::Children)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Child => "child",
            Self::Children => "children",
            Self::VariationBranch { .. } => "variation branch",
        }
    }
}

///
/// TESTS
///
