//! Writers for the residue-scoped dummy topology (`.rtf`) and parameter (`.prm`) files.
//!
//! Only atoms whose type state is [`AtomTypeState::Mutated`] and bonded terms touching at
//! least one such atom are emitted. Section headers are always written, so a state without
//! mutated atoms still produces a well-formed file.
//!
//! [`AtomTypeState::Mutated`]: crate::core::models::atom::AtomTypeState::Mutated

use crate::core::models::ids::AtomId;
use crate::core::models::system::ResidueView;
use std::io::{self, Write};
use tracing::debug;

pub const RTF_FILE_NAME: &str = "dummy_atom_definitions.rtf";
pub const PRM_FILE_NAME: &str = "dummy_parameters.prm";

const RTF_HEADER: &str = "* Dummy atom parameters \n* generated by fepladder\n*\n36  1\n";

const PRM_HEADER: &str = "* Parameters generated by analogy by\n\
* CHARMM General Force Field (CGenFF) program version 1.0.0\n\
*\n\
! Automatically obtained dummy parameters \n\
! from fepladder\n";

const NONBONDED_HEADER: &str = "NONBONDED nbxmod  5 atom cdiel fshift vatom vdistance vfswitch -\n\
cutnb 14.0 ctofnb 12.0 ctonnb 10.0 eps 1.0 e14fac 1.0 wmin 1.5";

/// Renders a float the way the CHARMM tooling expects masses in topology files:
/// shortest round-trip form, always with a fractional part.
pub fn py_float_repr(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Writes `dummy_atom_definitions.rtf` content for the view.
pub fn write_rtf(view: &ResidueView<'_>, writer: &mut impl Write) -> io::Result<()> {
    writer.write_all(RTF_HEADER.as_bytes())?;
    for atom in view.atoms().filter(|a| a.is_mutated()) {
        debug!(
            atom = %atom.name,
            original_type = atom.type_state.original(),
            dummy_type = atom.atom_type(),
            "Writing dummy atom definition"
        );
        writeln!(
            writer,
            "{:<7} {:<6} {:<6} {:>6}",
            "MASS",
            "-1",
            atom.atom_type(),
            py_float_repr(atom.mass)
        )?;
    }
    Ok(())
}

/// Writes `dummy_parameters.prm` content for the view.
pub fn write_prm(view: &ResidueView<'_>, writer: &mut impl Write) -> io::Result<()> {
    let type_of = |id: AtomId| view.atom(id).map(|a| a.atom_type()).unwrap_or("X");

    writer.write_all(PRM_HEADER.as_bytes())?;
    writer.write_all(b"\nATOMS\n")?;
    for atom in view.atoms().filter(|a| a.is_mutated()) {
        writeln!(
            writer,
            "{:<7} {:<6} {:<6} {:>9.5}",
            "MASS",
            "-1",
            atom.atom_type(),
            atom.mass
        )?;
    }
    writer.write_all(b"\n\n")?;

    writer.write_all(b"BONDS\n")?;
    for bond in view.bonds().filter(|t| view.touches_mutated(*t)) {
        let [a1, a2] = bond.atoms;
        let p = bond.effective();
        writeln!(
            writer,
            "{:<7} {:<7} {:>9.5} {:>9.5} ",
            type_of(a1),
            type_of(a2),
            p.k,
            p.req
        )?;
    }

    writer.write_all(b"\n\n")?;
    writer.write_all(b"ANGLES\n")?;
    for angle in view.angles().filter(|t| view.touches_mutated(*t)) {
        let [a1, a2, a3] = angle.atoms;
        let p = angle.effective();
        writeln!(
            writer,
            "{:<7} {:<7} {:<7} {:>9.5} {:>9.5} ",
            type_of(a1),
            type_of(a2),
            type_of(a3),
            p.k,
            p.theteq
        )?;
    }

    writer.write_all(b"\n\n")?;
    writer.write_all(b"DIHEDRALS\n")?;
    for dihedral in view.dihedrals().filter(|t| view.touches_mutated(*t)) {
        let [a1, a2, a3, a4] = dihedral.atoms;
        for term in dihedral.effective() {
            writeln!(
                writer,
                "{:<7} {:<7} {:<7} {:<7} {:>6.5} {:>9.5} {:>9.5} ",
                type_of(a1),
                type_of(a2),
                type_of(a3),
                type_of(a4),
                term.phi_k,
                term.per,
                term.phase
            )?;
        }
    }

    writer.write_all(b"\n\n")?;
    writer.write_all(b"IMPROPERS\n")?;
    // The central atom must come first in the stored term.
    for improper in view.impropers().filter(|t| view.touches_mutated(*t)) {
        let [a1, a2, a3, a4] = improper.atoms;
        let p = improper.effective();
        writeln!(
            writer,
            "{:<7} {:<7} {:<7} {:<7} {:>9.5} {:>9.5} ",
            type_of(a1),
            type_of(a2),
            type_of(a3),
            type_of(a4),
            p.psi_k,
            p.psi_eq
        )?;
    }

    writer.write_all(b"\n\n")?;
    writer.write_all(NONBONDED_HEADER.as_bytes())?;
    writer.write_all(b"\n\n")?;
    for atom in view.atoms().filter(|a| a.is_mutated()) {
        let lj = atom.effective_lj();
        writeln!(
            writer,
            "{:<7} {:>6} {:>9.5} {:>9.5}",
            atom.atom_type(),
            "0.0",
            lj.epsilon,
            lj.rmin
        )?;
    }

    writer.write_all(b"\n")?;
    writer.write_all(b"END")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{Atom, LennardJones};
    use crate::core::models::system::MolecularSystem;
    use crate::core::models::topology::{BondParams, DihedralTerm};
    use nalgebra::Point3;

    fn methanol() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let lig = system.add_residue("HETA", 1, "MOL");
        let c = system
            .add_atom_to_residue(
                lig,
                Atom::new("C1", "CG331", lig, Point3::origin())
                    .with_mass(12.011)
                    .with_lj(LennardJones::new(-0.078, 2.05)),
            )
            .unwrap();
        let o = system
            .add_atom_to_residue(
                lig,
                Atom::new("O1", "OG311", lig, Point3::new(1.4, 0.0, 0.0))
                    .with_mass(15.999)
                    .with_lj(LennardJones::new(-0.192, 1.765)),
            )
            .unwrap();
        let h = system
            .add_atom_to_residue(
                lig,
                Atom::new("H1", "HGP1", lig, Point3::new(1.8, 0.9, 0.0))
                    .with_mass(1.008)
                    .with_lj(LennardJones::new(-0.046, 0.2245)),
            )
            .unwrap();
        let w = system.add_residue("SOLV", 1, "TIP3");
        let ow = system
            .add_atom_to_residue(w, Atom::new("OH2", "OT", w, Point3::new(5.0, 0.0, 0.0)))
            .unwrap();
        system
            .add_bond([c, o], BondParams { k: 428.0, req: 1.42 })
            .unwrap();
        system
            .add_bond([o, h], BondParams { k: 545.0, req: 0.96 })
            .unwrap();
        system
            .add_bond([h, ow], BondParams { k: 1.0, req: 2.0 })
            .unwrap();
        system
            .add_dihedral(
                [h, o, c, c],
                vec![
                    DihedralTerm { phi_k: 0.18, per: 3.0, phase: 0.0 },
                    DihedralTerm { phi_k: 0.05, per: 1.0, phase: 180.0 },
                ],
            )
            .unwrap();
        system
    }

    fn render(system: &MolecularSystem) -> (String, String) {
        let view = system.view("MOL");
        let mut rtf = Vec::new();
        let mut prm = Vec::new();
        write_rtf(&view, &mut rtf).unwrap();
        write_prm(&view, &mut prm).unwrap();
        (
            String::from_utf8(rtf).unwrap(),
            String::from_utf8(prm).unwrap(),
        )
    }

    #[test]
    fn py_float_repr_keeps_a_fractional_digit() {
        assert_eq!(py_float_repr(12.0), "12.0");
        assert_eq!(py_float_repr(12.011), "12.011");
        assert_eq!(py_float_repr(1.008), "1.008");
    }

    #[test]
    fn unmutated_residue_produces_headers_only() {
        let (rtf, prm) = render(&methanol());
        assert_eq!(rtf, RTF_HEADER);
        let expected = format!(
            "{PRM_HEADER}\nATOMS\n\n\nBONDS\n\n\nANGLES\n\n\nDIHEDRALS\n\n\nIMPROPERS\n\n\n{NONBONDED_HEADER}\n\n\nEND"
        );
        assert_eq!(prm, expected);
    }

    #[test]
    fn mutated_hydrogen_emits_its_terms_only() {
        let mut system = methanol();
        let h = system.find_tagged_atom("MOL", "H1").unwrap();
        {
            let atom = system.atom_mut(h).unwrap();
            atom.mutate_type("DDX1");
            atom.modified_lj = Some(LennardJones::new(0.0, 0.2245));
        }
        let (rtf, prm) = render(&system);

        assert!(rtf.ends_with("MASS    -1     DDX1    1.008\n"));
        assert!(prm.contains("\nATOMS\nMASS    -1     DDX1     1.00800\n"));
        assert!(prm.contains("BONDS\nOG311   DDX1    545.00000   0.96000 \n\n\n"));
        assert!(!prm.contains("CG331   OG311"));
        assert!(!prm.contains(" OT "));
        assert!(prm.contains("DDX1    OG311   CG331   CG331   0.18000   3.00000   0.00000 \n"));
        assert!(prm.contains("DDX1    OG311   CG331   CG331   0.05000   1.00000 180.00000 \n"));
        assert!(prm.contains("DDX1       0.0   0.00000   0.22450\n\nEND"));
    }

    #[test]
    fn modified_bond_parameters_take_precedence() {
        let mut system = methanol();
        let h = system.find_tagged_atom("MOL", "H1").unwrap();
        system.atom_mut(h).unwrap().mutate_type("DDX1");
        system.bonds_mut()[1].modified = Some(BondParams { k: 0.0, req: 0.96 });
        let (_, prm) = render(&system);
        assert!(prm.contains("OG311   DDX1      0.00000   0.96000 \n"));
    }
}
