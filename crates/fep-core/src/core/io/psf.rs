use super::traits::{TopologyFile, TopologyWriteError};
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::Term;
use std::collections::HashMap;
use std::io::Write;

const TITLE: &str = "* Generated by fepladder";

/// CHARMM PSF writer using the `EXT XPLOR` layout (string atom types, wide fields).
pub struct PsfFile;

fn serial_map(system: &MolecularSystem) -> HashMap<AtomId, usize> {
    system
        .ordered_atom_ids()
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i + 1))
        .collect()
}

fn term_serials<const N: usize, P>(
    terms: &[Term<N, P>],
    serials: &HashMap<AtomId, usize>,
) -> Result<Vec<[usize; N]>, TopologyWriteError> {
    terms
        .iter()
        .map(|term| {
            let mut out = [0usize; N];
            for (slot, id) in out.iter_mut().zip(term.atoms.iter()) {
                *slot = *serials.get(id).ok_or_else(|| {
                    TopologyWriteError::Inconsistency(format!(
                        "Bonded term references atom {:?} that is not in any residue",
                        id
                    ))
                })?;
            }
            Ok(out)
        })
        .collect()
}

fn write_section<const N: usize>(
    writer: &mut impl Write,
    label: &str,
    entries: &[[usize; N]],
    per_line: usize,
) -> Result<(), TopologyWriteError> {
    writeln!(writer, "{:>10} {}", entries.len(), label)?;
    for chunk in entries.chunks(per_line) {
        for entry in chunk {
            for serial in entry {
                write!(writer, "{:>10}", serial)?;
            }
        }
        writeln!(writer)?;
    }
    writeln!(writer)?;
    Ok(())
}

impl TopologyFile for PsfFile {
    fn write_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), TopologyWriteError> {
        let serials = serial_map(system);

        writeln!(writer, "PSF EXT XPLOR")?;
        writeln!(writer)?;
        writeln!(writer, "{:>10} !NTITLE", 1)?;
        writeln!(writer, "{}", TITLE)?;
        writeln!(writer)?;

        writeln!(writer, "{:>10} !NATOM", serials.len())?;
        let mut serial = 0;
        for (_, residue) in system.residues_iter() {
            for &atom_id in residue.atoms() {
                let atom = system.atom(atom_id).ok_or_else(|| {
                    TopologyWriteError::Inconsistency(format!(
                        "Residue {} lists missing atom {:?}",
                        residue.name, atom_id
                    ))
                })?;
                serial += 1;
                writeln!(
                    writer,
                    "{:>10} {:<8} {:<8} {:<8} {:<8} {:<6} {:>10.6} {:>13.4} {:>11}",
                    serial,
                    residue.segment,
                    residue.number,
                    residue.name,
                    atom.name,
                    atom.atom_type(),
                    atom.charge,
                    atom.mass,
                    0
                )?;
            }
        }
        writeln!(writer)?;

        write_section(
            writer,
            "!NBOND: bonds",
            &term_serials(system.bonds(), &serials)?,
            4,
        )?;
        write_section(
            writer,
            "!NTHETA: angles",
            &term_serials(system.angles(), &serials)?,
            3,
        )?;
        write_section(
            writer,
            "!NPHI: dihedrals",
            &term_serials(system.dihedrals(), &serials)?,
            2,
        )?;
        write_section(
            writer,
            "!NIMPHI: impropers",
            &term_serials(system.impropers(), &serials)?,
            2,
        )?;

        writeln!(writer, "{:>10} !NDON: donors", 0)?;
        writeln!(writer)?;
        writeln!(writer, "{:>10} !NACC: acceptors", 0)?;
        writeln!(writer)?;
        writeln!(writer, "{:>10} !NNB", 0)?;
        writeln!(writer)?;
        let natom = serials.len();
        for start in (0..natom).step_by(8) {
            for _ in start..(start + 8).min(natom) {
                write!(writer, "{:>10}", 0)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer)?;
        writeln!(writer, "{:>10}{:>10} !NGRP NST2", 1, 0)?;
        writeln!(writer, "{:>10}{:>10}{:>10}", 0, 0, 0)?;
        writeln!(writer)?;
        Ok(())
    }
}
