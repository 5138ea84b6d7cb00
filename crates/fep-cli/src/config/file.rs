use crate::error::{CliError, Result};
use fepladder::core::mutation::MutationSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub free_energy_type: Option<String>,
    pub strategy: Option<String>,
    pub simulation: Option<FileSimulationConfig>,
    pub paths: Option<FilePathsConfig>,
    #[serde(default)]
    pub structures: Vec<FileStructureConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSimulationConfig {
    pub nsteps: Option<u64>,
    pub nstdcd: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePathsConfig {
    pub analysis_dir_base: Option<PathBuf>,
    pub data_dir_base: Option<PathBuf>,
    pub bin_dir: Option<PathBuf>,
    pub toppar_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileStructureConfig {
    pub name: String,
    pub tlc: String,
    pub waterbox: Option<FileEnvironmentFiles>,
    pub complex: Option<FileEnvironmentFiles>,
    #[serde(default)]
    pub mutations: Vec<MutationSpec>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEnvironmentFiles {
    pub intermediate_filename: Option<String>,
    pub crd_file_name: Option<String>,
    pub rst_file_name: Option<String>,
    pub simulation_parameter: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
