//! Generation runs.
//!
//! A run builds the schema from a node stream, resolves the [`Model`] and
//! hands it to every registered [`Emitter`]. Emitters run concurrently over
//! the same immutable model; a structural or key error aborts the run before
//! any emitter starts.

mod manifest;


pub use manifest::ManifestEmitter;

use keystone_config::GeneratorConfig;
use keystone_core::{Model, ModelError, path::UnreachableMember};
use keystone_schema::{build::SchemaBuilder, source::NodeRecord};
use std::{collections::BTreeMap, thread};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] keystone_schema::build::BuildError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("emitter '{emitter}' failed: {source}")]
    Emit { emitter: String, source: EmitError },

    #[error("artifact '{path}' is produced by both '{first}' and '{second}'")]
    ArtifactConflict {
        path: String,
        first: String,
        second: String,
    },
}

///
/// EmitError
///

#[derive(Debug, ThisError)]
pub enum EmitError {
    #[error(transparent)]
    Path(#[from] UnreachableMember),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),

    #[error("emitter panicked")]
    Panicked,
}

///
/// Artifact
/// One generated file, addressed relative to the output root.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    pub path: String,
    pub contents: String,
}

impl Artifact {
    #[must_use]
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

///
/// Emitter
///
/// Turns the model into artifacts. Emitters only read the model and may run
/// on any thread.
///

pub trait Emitter: Send + Sync {
    fn name(&self) -> &str;

    fn emit(&self, model: &Model) -> Result<Vec<Artifact>, EmitError>;
}

///
/// Generator
///

#[derive(Default)]
pub struct Generator {
    config: GeneratorConfig,
    emitters: Vec<Box<dyn Emitter>>,
}

impl Generator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            emitters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: impl Emitter + 'static) -> Self {
        self.emitters.push(Box::new(emitter));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build and resolve the model without emitting anything.
    pub fn model(
        &self,
        records: impl IntoIterator<Item = NodeRecord>,
    ) -> Result<Model, BuildError> {
        let schema = SchemaBuilder::new(&self.config).build(records)?;

        Ok(Model::new(schema, &self.config)?)
    }

    /// Run every emitter and return all artifacts sorted by path.
    pub fn run(
        &self,
        records: impl IntoIterator<Item = NodeRecord>,
    ) -> Result<Vec<Artifact>, BuildError> {
        tracing::info!(emitters = self.emitters.len(), "generation started");

        let model = self.model(records)?;
        let outputs = self.emit_all(&model);

        let mut artifacts: BTreeMap<String, (String, Artifact)> = BTreeMap::new();
        for (emitter, result) in outputs {
            let produced = result.map_err(|source| BuildError::Emit {
                emitter: emitter.clone(),
                source,
            })?;

            for artifact in produced {
                if let Some((first, _)) = artifacts.get(&artifact.path) {
                    return Err(BuildError::ArtifactConflict {
                        path: artifact.path,
                        first: first.clone(),
                        second: emitter,
                    });
                }
                artifacts.insert(artifact.path.clone(), (emitter.clone(), artifact));
            }
        }

        tracing::info!(
            aggregates = model.schema().len(),
            artifacts = artifacts.len(),
            "generation finished"
        );

        Ok(artifacts.into_values().map(|(_, artifact)| artifact).collect())
    }

    // results come back in registration order
    fn emit_all(&self, model: &Model) -> Vec<(String, Result<Vec<Artifact>, EmitError>)> {
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .emitters
                .iter()
                .map(|emitter| (emitter.name(), scope.spawn(move || emitter.emit(model))))
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| {
                    let result = handle.join().unwrap_or(Err(EmitError::Panicked));
                    tracing::debug!(emitter = name, ok = result.is_ok(), "emitter finished");

                    (name.to_string(), result)
                })
                .collect()
        })
    }
}
