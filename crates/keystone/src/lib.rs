//! ## Crate layout
//! - `schema`: node records, the graph builder and structural errors.
//! - `core`: key and path resolution, instance key encoding, the read-only model.
//! - `build`: generation runs and the emitter seam.
//! - `config`: generator configuration loaded from TOML.
//!
//! The `prelude` module carries everything an emitter or a schema frontend
//! usually needs.

pub use keystone_build as build;
pub use keystone_config as config;
pub use keystone_core as core;
pub use keystone_schema as schema;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use keystone_build::{Artifact, BuildError, EmitError, Emitter, Generator, ManifestEmitter};
pub use keystone_config::GeneratorConfig;
pub use keystone_core::{Error, Model};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{Artifact, BuildError, EmitError, Emitter, Generator, ManifestEmitter},
        config::{ConfigError, GeneratorConfig},
        core::prelude::*,
        schema::prelude::*,
    };
}
