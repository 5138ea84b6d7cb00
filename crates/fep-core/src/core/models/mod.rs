//! # Core Models Module
//!
//! Data structures describing a topology that can be mutated alchemically and written
//! back out as simulation input.
//!
//! - [`atom`] - Atoms with their charge, mass, Lennard-Jones parameters and alchemical type state
//! - [`residue`] - Residues grouping atoms under a three-letter tag
//! - [`topology`] - Bonded terms with base parameters and optional mutation overrides
//! - [`system`] - The complete topology and residue-scoped views of it
//! - [`environment`] - The waterbox/complex environment tag
//! - [`ids`] - Stable identifier types for atoms and residues
//!
//! ```ignore
//! use fepladder::core::models::{atom::Atom, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let lig = system.add_residue("HETA", 1, "LIG");
//! let c1 = system.add_atom_to_residue(lig, Atom::new("C1", "CG331", lig, Point3::origin()));
//! ```

pub mod atom;
pub mod environment;
pub mod ids;
pub mod residue;
pub mod system;
pub mod topology;
