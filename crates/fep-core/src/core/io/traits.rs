use crate::core::models::system::MolecularSystem;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyWriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

/// Defines the interface for writing a topology in a specific file format.
///
/// Reading these formats belongs to the external topology parser; the core only
/// persists the topologies it has mutated.
pub trait TopologyFile {
    /// Writes a molecular system to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the system references atoms it does not contain.
    fn write_to(system: &MolecularSystem, writer: &mut impl Write)
    -> Result<(), TopologyWriteError>;

    /// Writes a molecular system to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        system: &MolecularSystem,
        path: P,
    ) -> Result<(), TopologyWriteError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(system, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
