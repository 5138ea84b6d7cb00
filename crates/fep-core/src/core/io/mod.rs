//! Provides output functionality for the files an intermediate state consists of.
//!
//! Topologies are written through the [`traits::TopologyFile`] interface (PSF and PDB).
//! The force-field side files (dummy RTF/PRM and the stream manifest) and the rewritten
//! simulation-parameter template are plain writers. Per-pair energy result files are
//! both written and read here, since the estimator consumes what the re-evaluator produced.

pub mod dummy_params;
pub mod pdb;
pub mod psf;
pub mod results;
pub mod template;
pub mod toppar;
pub mod traits;
