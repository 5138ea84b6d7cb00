//! # Engine Module
//!
//! The logic core between the topology models and the end-to-end workflows.
//!
//! - **Configuration** ([`config`]) - Structures, sampling parameters and paths, with validation
//! - **Sequencing** ([`sequencer`]) - Ordering mutation steps into the intermediate-state ladder
//! - **Directory Layout** ([`layout`]) - Where every file of a state and its base setup lives
//! - **External Contracts** ([`simulation`]) - Simulation engine and trajectory reader traits,
//!   and the reduced-potential formula
//! - **Estimation** ([`estimator`]) - The reduced-potential matrix and the re-weighting seam
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - The aggregated error type of all workflows

pub mod config;
pub mod error;
pub mod estimator;
pub mod layout;
pub mod progress;
pub mod sequencer;
pub mod simulation;
