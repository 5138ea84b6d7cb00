//! # Core Module
//!
//! The foundation of the library: topology data structures, the alchemical mutations that
//! act on them, and the writers and readers for every file an intermediate state consists of.
//!
//! - **Topology Representation** ([`models`]) - Atoms, residues, bonded terms and systems
//! - **Alchemical Mutations** ([`mutation`]) - Charge, steric and bonded scaling operations
//! - **File I/O** ([`io`]) - PSF/PDB, dummy parameter files, templates and result files
//!
//! Nothing in this module touches the state directory layout or the simulation engine;
//! those concerns live in [`crate::engine`] and [`crate::workflows`].

pub mod io;
pub mod models;
pub mod mutation;
