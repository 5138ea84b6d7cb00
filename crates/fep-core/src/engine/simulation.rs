//! Contracts for the external collaborators of the re-evaluation protocol, and the
//! reduced-potential formula they feed.
//!
//! The molecular simulation engine and the trajectory reader are not part of this
//! library. Callers plug them in by implementing [`SimulationEngine`] (with its
//! [`EnergyContext`]) and [`TrajectoryReader`].

use nalgebra::Point3;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Opaque error raised by an external collaborator.
pub type ExternalError = Box<dyn Error + Send + Sync>;

/// Boltzmann constant in J/K.
pub const BOLTZMANN_J_PER_K: f64 = 1.380649e-23;
/// Avogadro constant in 1/mol.
pub const AVOGADRO_PER_MOL: f64 = 6.02214076e23;
/// One standard atmosphere in Pa.
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;
/// Temperature at which all states are re-evaluated, in K.
pub const TEMPERATURE_K: f64 = 300.0;

const NM3_TO_M3: f64 = 1e-27;
const KJ_TO_J: f64 = 1e3;

/// Files that define the potential of one intermediate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentialFiles {
    /// Serialized system (`<stem>_system.xml`).
    pub system_xml: PathBuf,
    /// Serialized integrator (`<stem>_integrator.xml`).
    pub integrator_xml: PathBuf,
    /// Topology (`<stem>.psf`).
    pub topology: PathBuf,
    /// Saved simulation state (`<stem>.rst`).
    pub state: PathBuf,
}

/// A live evaluation context built from one state's potential.
pub trait EnergyContext {
    /// Sets a cubic periodic box with the given edge length in nm.
    fn set_periodic_box(&mut self, edge_nm: f64) -> Result<(), ExternalError>;

    /// Sets all particle positions, in nm.
    fn set_positions(&mut self, positions: &[Point3<f64>]) -> Result<(), ExternalError>;

    /// The potential energy of the current configuration, in kJ/mol.
    fn potential_energy(&mut self) -> Result<f64, ExternalError>;
}

/// Builds evaluation contexts from serialized potentials.
pub trait SimulationEngine {
    type Context: EnergyContext;

    /// Deserializes system and integrator, loads the topology and restores the saved state.
    fn load(&self, files: &PotentialFiles) -> Result<Self::Context, ExternalError>;
}

/// One trajectory frame: positions in nm and the edge of the (cubic) unit cell in nm.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub positions: Vec<Point3<f64>>,
    pub cell_length_nm: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub frames: Vec<Frame>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Reads saved conformations.
pub trait TrajectoryReader {
    fn read(&self, trajectory: &Path, topology: &Path) -> Result<Trajectory, ExternalError>;
}

/// `u = β·(U/N_A + p·V)` for an NpT ensemble at [`TEMPERATURE_K`] and one atmosphere.
///
/// `potential_energy_kj_mol` is the molar potential energy; `box_edge_nm` is the edge of the
/// cubic cell whose volume enters the `p·V` term. The result is dimensionless.
pub fn reduced_potential(potential_energy_kj_mol: f64, box_edge_nm: f64) -> f64 {
    reduced_potential_at(
        potential_energy_kj_mol,
        box_edge_nm,
        TEMPERATURE_K,
        STANDARD_PRESSURE_PA,
    )
}

pub fn reduced_potential_at(
    potential_energy_kj_mol: f64,
    box_edge_nm: f64,
    temperature_k: f64,
    pressure_pa: f64,
) -> f64 {
    let beta = 1.0 / (BOLTZMANN_J_PER_K * temperature_k);
    let energy_per_particle = potential_energy_kj_mol * KJ_TO_J / AVOGADRO_PER_MOL;
    let volume = box_edge_nm.powi(3) * NM3_TO_M3;
    beta * (energy_per_particle + pressure_pa * volume)
}
