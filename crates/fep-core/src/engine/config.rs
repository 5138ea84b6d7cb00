use crate::core::models::environment::Environment;
use std::path::PathBuf;
use thiserror::Error;

/// Minimum number of trajectory frames (`nsteps / nstdcd`) a state must produce.
pub const MIN_FRAMES_PER_STATE: u64 = 20;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error(
        "nsteps ({nsteps}) and nstdcd ({nstdcd}) yield fewer than {min} frames per state",
        min = MIN_FRAMES_PER_STATE
    )]
    InsufficientSampling { nsteps: u64, nstdcd: u64 },

    #[error("Unknown sequencing strategy: '{0}'")]
    UnknownStrategy(String),

    #[error("Both structures are named '{0}'")]
    DuplicateStructureName(String),
}

/// Per-environment file naming of one structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFiles {
    /// Stem shared by the state's `.inp`, `.psf`, `.rst`, `.dcd` and serialized XML files.
    pub intermediate_filename: String,
    /// Stem of the `.crd` file in the base setup.
    pub crd_file_name: String,
    /// Stem of the `.rst` file in the base setup.
    pub rst_file_name: String,
    /// File name of the simulation-parameter template in the base setup.
    pub simulation_parameter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureConfig {
    pub name: String,
    pub tlc: String,
    pub waterbox: EnvironmentFiles,
    pub complex: EnvironmentFiles,
}

impl StructureConfig {
    pub fn files(&self, environment: Environment) -> &EnvironmentFiles {
        match environment {
            Environment::Waterbox => &self.waterbox,
            Environment::Complex => &self.complex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub nsteps: u64,
    pub nstdcd: u64,
    pub free_energy_type: String,
}

impl SimulationConfig {
    /// Number of frames each state's trajectory will contain.
    pub fn frames_per_state(&self) -> u64 {
        self.nsteps.checked_div(self.nstdcd).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Root of all generated output (state ladders and results).
    pub analysis_dir_base: PathBuf,
    /// Root of the per-structure base setups.
    pub data_dir_base: PathBuf,
    /// Directory holding `simulation.sh`.
    pub bin_dir: PathBuf,
    /// Force-field tree copied into every state as `toppar/`.
    pub toppar_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FepConfig {
    pub structures: [StructureConfig; 2],
    pub simulation: SimulationConfig,
    pub paths: PathsConfig,
}

impl FepConfig {
    /// `<structure1>-<structure2>-<free_energy_type>`
    pub fn system_name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.structures[0].name, self.structures[1].name, self.simulation.free_energy_type
        )
    }

    pub fn system_dir(&self) -> PathBuf {
        self.paths.analysis_dir_base.join(self.system_name())
    }

    pub fn results_dir(&self) -> PathBuf {
        self.system_dir().join("results")
    }

    /// Resolves a structure by name, checking the first structure before the second.
    pub fn structure(&self, name: &str) -> Option<&StructureConfig> {
        self.structures.iter().find(|s| s.name == name)
    }

    /// The base setup directory of a structure (`<data_dir_base>/<name>`).
    pub fn base_setup_dir(&self, structure: &StructureConfig) -> PathBuf {
        self.paths.data_dir_base.join(&structure.name)
    }

    /// The directory holding a structure's `intst<N>` ladder (`<analysis_dir_base>/<name>`).
    pub fn ladder_dir(&self, structure_name: &str) -> PathBuf {
        self.paths.analysis_dir_base.join(structure_name)
    }
}

#[derive(Default)]
pub struct FepConfigBuilder {
    structure1: Option<StructureConfig>,
    structure2: Option<StructureConfig>,
    nsteps: Option<u64>,
    nstdcd: Option<u64>,
    free_energy_type: Option<String>,
    analysis_dir_base: Option<PathBuf>,
    data_dir_base: Option<PathBuf>,
    bin_dir: Option<PathBuf>,
    toppar_dir: Option<PathBuf>,
}

impl FepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure1(mut self, structure: StructureConfig) -> Self {
        self.structure1 = Some(structure);
        self
    }
    pub fn structure2(mut self, structure: StructureConfig) -> Self {
        self.structure2 = Some(structure);
        self
    }
    pub fn nsteps(mut self, nsteps: u64) -> Self {
        self.nsteps = Some(nsteps);
        self
    }
    pub fn nstdcd(mut self, nstdcd: u64) -> Self {
        self.nstdcd = Some(nstdcd);
        self
    }
    pub fn free_energy_type(mut self, kind: impl Into<String>) -> Self {
        self.free_energy_type = Some(kind.into());
        self
    }
    pub fn analysis_dir_base(mut self, path: PathBuf) -> Self {
        self.analysis_dir_base = Some(path);
        self
    }
    pub fn data_dir_base(mut self, path: PathBuf) -> Self {
        self.data_dir_base = Some(path);
        self
    }
    pub fn bin_dir(mut self, path: PathBuf) -> Self {
        self.bin_dir = Some(path);
        self
    }
    pub fn toppar_dir(mut self, path: PathBuf) -> Self {
        self.toppar_dir = Some(path);
        self
    }

    pub fn build(self) -> Result<FepConfig, ConfigError> {
        let structure1 = self
            .structure1
            .ok_or(ConfigError::MissingParameter("structure1"))?;
        let structure2 = self
            .structure2
            .ok_or(ConfigError::MissingParameter("structure2"))?;
        if structure1.name == structure2.name {
            return Err(ConfigError::DuplicateStructureName(structure1.name));
        }

        let nsteps = self.nsteps.ok_or(ConfigError::MissingParameter("nsteps"))?;
        let nstdcd = self.nstdcd.ok_or(ConfigError::MissingParameter("nstdcd"))?;
        if nstdcd == 0 || (nsteps as f64 / nstdcd as f64) < MIN_FRAMES_PER_STATE as f64 {
            return Err(ConfigError::InsufficientSampling { nsteps, nstdcd });
        }

        let simulation = SimulationConfig {
            nsteps,
            nstdcd,
            free_energy_type: self
                .free_energy_type
                .ok_or(ConfigError::MissingParameter("free_energy_type"))?,
        };
        let paths = PathsConfig {
            analysis_dir_base: self
                .analysis_dir_base
                .ok_or(ConfigError::MissingParameter("analysis_dir_base"))?,
            data_dir_base: self
                .data_dir_base
                .ok_or(ConfigError::MissingParameter("data_dir_base"))?,
            bin_dir: self.bin_dir.ok_or(ConfigError::MissingParameter("bin_dir"))?,
            toppar_dir: self
                .toppar_dir
                .ok_or(ConfigError::MissingParameter("toppar_dir"))?,
        };

        Ok(FepConfig {
            structures: [structure1, structure2],
            simulation,
            paths,
        })
    }
}
