//! # Workflows Module
//!
//! High-level procedures that drive a relative free-energy calculation from the two
//! prepared end states to the final estimate.
//!
//! ## Overview
//!
//! A calculation runs in three stages. The ladder of intermediate states is built from a
//! parsed topology and a list of mutations, the states are simulated externally, and the
//! saved conformations are re-evaluated under every state's potential. The resulting
//! reduced-potential matrices are then handed to an estimator.
//!
//! ## Architecture
//!
//! - **Build Workflow** ([`build`]) - Sequences mutations and writes one self-contained
//!   `intst<N>` directory per intermediate state, for both environments.
//! - **Evaluate Workflow** ([`evaluate`]) - Re-evaluates trajectories across state pairs
//!   through the [`crate::engine::simulation`] collaborators and stores per-pair results.
//! - **Analyze Workflow** ([`analyze`]) - Loads the per-pair results and computes free-energy
//!   differences, uncertainties and overlap per environment.

pub mod analyze;
pub mod build;
pub mod evaluate;
