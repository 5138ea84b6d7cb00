use super::config::ConfigError;
use super::estimator::EstimatorError;
use super::simulation::ExternalError;
use crate::core::io::results::ResultFileError;
use crate::core::io::template::TemplateError;
use crate::core::io::traits::TopologyWriteError;
use crate::core::models::environment::ParseEnvironmentError;
use crate::core::mutation::MutationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not find structure entry for '{name}'")]
    StructureNotFound { name: String },

    #[error("{0}")]
    InvalidEnvironment(String),

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Output directory '{0}' already exists")]
    DirectoryExists(PathBuf),

    #[error(transparent)]
    ResultFile(#[from] ResultFileError),

    #[error("Mutation failed: {0}")]
    Mutation(#[from] MutationError),

    #[error("Failed to rewrite simulation parameters '{path}': {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("Failed to write topology '{path}': {source}")]
    TopologyWrite {
        path: PathBuf,
        #[source]
        source: TopologyWriteError,
    },

    #[error("Simulation engine failed for intermediate state {state}: {source}")]
    Simulation {
        state: usize,
        #[source]
        source: ExternalError,
    },

    #[error("Failed to read trajectory '{path}': {source}")]
    Trajectory {
        path: PathBuf,
        #[source]
        source: ExternalError,
    },

    #[error("Missing reduced potentials for potential state {potential_state} on conformations of state {conformation_state}")]
    MissingPair {
        potential_state: usize,
        conformation_state: usize,
    },

    #[error(
        "Conformation state {conformation_state} has {found} samples under potential state {potential_state}, expected {expected}"
    )]
    NonRectangular {
        potential_state: usize,
        conformation_state: usize,
        expected: usize,
        found: usize,
    },

    #[error("Waterbox has {waterbox} states but complex has {complex}")]
    StateCountMismatch { waterbox: usize, complex: usize },

    #[error("Estimator failed: {0}")]
    Estimator(#[from] EstimatorError),
}

impl From<ParseEnvironmentError> for EngineError {
    fn from(err: ParseEnvironmentError) -> Self {
        Self::InvalidEnvironment(err.to_string())
    }
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
