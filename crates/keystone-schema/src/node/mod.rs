mod aggregate;
mod member;
mod schema;


pub use aggregate::*;
pub use member::*;
pub use schema::*;

use derive_more::Display;
use serde::Serialize;

///
/// AggregateId
/// Index of an aggregate in the schema arena. Only minted by the builder.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("a{_0}")]
pub struct AggregateId(pub(crate) usize);

impl AggregateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// MemberId
/// Index of a member in the schema arena. Only minted by the builder.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("m{_0}")]
pub struct MemberId(pub(crate) usize);

impl MemberId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}
