use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// One structural problem found while building or classifying the schema.
/// Every variant carries the route of the offending node.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("malformed schema at '{route}': {message}")]
    MalformedSchema { route: String, message: String },

    #[error("duplicate name '{name}' at '{route}'")]
    DuplicateName { route: String, name: String },

    #[error("unresolved reference target '{target}' at '{route}'")]
    UnresolvedReferenceTarget { route: String, target: String },

    #[error("schema violation at '{route}': {message}")]
    SchemaViolation { route: String, message: String },
}

impl SchemaError {
    pub fn malformed(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSchema {
            route: route.into(),
            message: message.into(),
        }
    }

    pub fn violation(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            route: route.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn route(&self) -> &str {
        match self {
            Self::MalformedSchema { route, .. }
            | Self::DuplicateName { route, .. }
            | Self::UnresolvedReferenceTarget { route, .. }
            | Self::SchemaViolation { route, .. } => route,
        }
    }
}

///
/// ErrorTree
///
/// Ordered collection of schema errors, in detection order.
/// Builder passes keep going after a failure so one run reports everything.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    errors: Vec<SchemaError>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, err: impl Into<SchemaError>) {
        self.errors.push(err.into());
    }

    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.errors.iter()
    }

    /// All errors reported for one route.
    pub fn for_route<'a>(&'a self, route: &'a str) -> impl Iterator<Item = &'a SchemaError> {
        self.errors.iter().filter(move |e| e.route() == route)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<SchemaError> {
        self.errors
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

impl From<SchemaError> for ErrorTree {
    fn from(err: SchemaError) -> Self {
        Self { errors: vec![err] }
    }
}

/// Record a `SchemaViolation` for a route with a formatted message.
#[macro_export]
macro_rules! violation {
    ($errs:expr, $route:expr, $($arg:tt)*) => {
        $errs.add($crate::error::SchemaError::violation($route, format!($($arg)*)))
    };
}

///
/// TESTS
///
