//! # fepladder Core Library
//!
//! Builds alchemical free-energy perturbation ladders between two ligands that share a
//! common core, and turns the simulated ladder back into a free-energy estimate.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Topology models (`MolecularSystem`), the alchemical
//!   mutations acting on them, and the file writers/readers for state bundles and results.
//!
//! - **[`engine`]: The Logic Core.** Configuration and validation, the mutation sequencer,
//!   the per-state directory layout, the reduced-potential protocol, the estimator seam,
//!   progress reporting and the aggregated error type.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures: building all intermediate
//!   states, re-evaluating energies across state pairs, and computing free energies.
//!
//! The molecular simulation engine, the topology parser and the trajectory reader are
//! external collaborators. They enter the library through the traits in
//! [`engine::simulation`].

pub mod core;
pub mod engine;
pub mod workflows;
