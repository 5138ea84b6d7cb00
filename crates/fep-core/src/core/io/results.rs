use crate::core::models::environment::Environment;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultFileError {
    #[error("Failed to access result file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed result file '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reduced potentials of one `(potential, conformation)` state pair, per environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairEnergies {
    pub waterbox: Vec<f64>,
    pub complex: Vec<f64>,
}

impl PairEnergies {
    pub fn get(&self, environment: Environment) -> &[f64] {
        match environment {
            Environment::Waterbox => &self.waterbox,
            Environment::Complex => &self.complex,
        }
    }

    pub fn set(&mut self, environment: Environment, energies: Vec<f64>) {
        match environment {
            Environment::Waterbox => self.waterbox = energies,
            Environment::Complex => self.complex = energies,
        }
    }

    pub fn read_from_path(path: &Path) -> Result<Self, ResultFileError> {
        let file = File::open(path).map_err(|source| ResultFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ResultFileError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Writes the energies as JSON, creating the parent directory if needed.
    pub fn write_to_path(&self, path: &Path) -> Result<(), ResultFileError> {
        let io_err = |source| ResultFileError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|source| ResultFileError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)
    }
}

/// `<results_dir>/energy_<structure>_<potential>_<conformation>.json`
pub fn pair_result_path(
    results_dir: &Path,
    structure: &str,
    potential_state: usize,
    conformation_state: usize,
) -> PathBuf {
    results_dir.join(format!(
        "energy_{}_{}_{}.json",
        structure, potential_state, conformation_state
    ))
}
