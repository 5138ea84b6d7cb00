use super::traits::{TopologyFile, TopologyWriteError};
use crate::core::models::system::MolecularSystem;
use std::io::Write;

/// PDB coordinate writer with CHARMM-style segment identifiers.
pub struct PdbFile;

fn padded_atom_name(name: &str) -> String {
    if name.len() >= 4 {
        name.chars().take(4).collect()
    } else {
        format!(" {:<3}", name)
    }
}

impl TopologyFile for PdbFile {
    fn write_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), TopologyWriteError> {
        if let Some(edge) = system.box_length() {
            writeln!(
                writer,
                "CRYST1{:>9.3}{:>9.3}{:>9.3}{:>7.2}{:>7.2}{:>7.2} P 1           1",
                edge, edge, edge, 90.0, 90.0, 90.0
            )?;
        }

        let mut serial = 0usize;
        for (_, residue) in system.residues_iter() {
            for &atom_id in residue.atoms() {
                let atom = system.atom(atom_id).ok_or_else(|| {
                    TopologyWriteError::Inconsistency(format!(
                        "Residue {} lists missing atom {:?}",
                        residue.name, atom_id
                    ))
                })?;
                serial += 1;
                // Serials above 99999 wrap, as CHARMM and OpenMM do.
                writeln!(
                    writer,
                    "ATOM  {:>5} {:<4} {:<4}{:>1}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}",
                    serial % 100_000,
                    padded_atom_name(&atom.name),
                    residue.name,
                    "",
                    residue.number % 10_000,
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                    1.0,
                    0.0,
                    residue.segment
                )?;
            }
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
