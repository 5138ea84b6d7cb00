use super::config::EnvironmentFiles;
use super::simulation::PotentialFiles;
use crate::core::models::environment::Environment;
use std::path::{Path, PathBuf};

/// Python helpers shipped with the base setup and copied into every state.
pub const HELPER_SCRIPTS: &[&str] = &[
    "omm_barostat.py",
    "omm_readinputs.py",
    "omm_readparams.py",
    "omm_restraints.py",
    "omm_rewrap.py",
    "omm_vfswitch.py",
];

pub const RUN_SCRIPT: &str = "openmm_run.py";
pub const SUBMIT_SCRIPT: &str = "simulation.sh";
pub const TOPPAR_DIR: &str = "toppar";

/// `<ladder_dir>/intst<index>`
pub fn state_dir(ladder_dir: &Path, index: usize) -> PathBuf {
    ladder_dir.join(format!("intst{}", index))
}

/// `lig_in_<environment>.<extension>`
pub fn topology_file_name(environment: Environment, extension: &str) -> String {
    format!("lig_in_{}.{}", environment, extension)
}

/// Locations inside a structure's base setup directory.
#[derive(Debug, Clone, Copy)]
pub struct BaseSetup<'a> {
    root: &'a Path,
}

impl<'a> BaseSetup<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    /// `<root>/<environment>/openmm`
    pub fn openmm_dir(&self, environment: Environment) -> PathBuf {
        self.root.join(environment.as_str()).join("openmm")
    }

    /// `<root>/complex/<tlc>` with the tag lowercased.
    pub fn ligand_dir(&self, tlc: &str) -> PathBuf {
        self.root
            .join(Environment::Complex.as_str())
            .join(tlc.to_lowercase())
    }

    pub fn crd_file(&self, environment: Environment, files: &EnvironmentFiles) -> PathBuf {
        self.openmm_dir(environment)
            .join(format!("{}.crd", files.crd_file_name))
    }

    pub fn rst_file(&self, environment: Environment, files: &EnvironmentFiles) -> PathBuf {
        self.openmm_dir(environment)
            .join(format!("{}.rst", files.rst_file_name))
    }

    pub fn simulation_parameter(
        &self,
        environment: Environment,
        files: &EnvironmentFiles,
    ) -> PathBuf {
        self.openmm_dir(environment)
            .join(&files.simulation_parameter)
    }

    /// Helper and run scripts are always taken from the complex setup.
    pub fn script(&self, name: &str) -> PathBuf {
        self.openmm_dir(Environment::Complex).join(name)
    }
}

/// The serialized potential of a state, as written by the patched run script.
pub fn potential_files(state_dir: &Path, intermediate_filename: &str) -> PotentialFiles {
    PotentialFiles {
        system_xml: state_dir.join(format!("{}_system.xml", intermediate_filename)),
        integrator_xml: state_dir.join(format!("{}_integrator.xml", intermediate_filename)),
        topology: state_dir.join(format!("{}.psf", intermediate_filename)),
        state: state_dir.join(format!("{}.rst", intermediate_filename)),
    }
}

/// The trajectory a state's simulation produced.
pub fn trajectory_file(state_dir: &Path, intermediate_filename: &str) -> PathBuf {
    state_dir.join(format!("{}.dcd", intermediate_filename))
}
