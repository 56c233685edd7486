use crate::{instance::KeyCodecError, key::KeyError, path::UnreachableMember};
use thiserror::Error as ThisError;

///
/// ModelError
///

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("key resolution failed:\n{}", render(.0))]
    KeyResolution(Vec<KeyError>),
}

impl ModelError {
    #[must_use]
    pub fn key_errors(&self) -> &[KeyError] {
        match self {
            Self::KeyResolution(errors) => errors,
        }
    }
}

fn render(errors: &[KeyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Codec(#[from] KeyCodecError),

    #[error(transparent)]
    Unreachable(#[from] UnreachableMember),
}
