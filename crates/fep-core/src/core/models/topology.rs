use super::ids::AtomId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BondParams {
    pub k: f64,   // Force constant (kcal/mol/A^2)
    pub req: f64, // Equilibrium length (A)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleParams {
    pub k: f64,      // Force constant (kcal/mol/rad^2)
    pub theteq: f64, // Equilibrium angle (degrees)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DihedralTerm {
    pub phi_k: f64, // Barrier height (kcal/mol)
    pub per: f64,   // Periodicity
    pub phase: f64, // Phase shift (degrees)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImproperParams {
    pub psi_k: f64,  // Force constant (kcal/mol/rad^2)
    pub psi_eq: f64, // Equilibrium improper angle (degrees)
}

/// A bonded interaction with base parameters and an optional mutation override.
///
/// Only terms touching a mutated atom ever receive `modified`; everything else keeps
/// its base parameters. `effective()` is the single place the fallback is decided.
#[derive(Debug, Clone, PartialEq)]
pub struct Term<const N: usize, P> {
    pub atoms: [AtomId; N],
    pub params: P,
    pub modified: Option<P>,
}

impl<const N: usize, P> Term<N, P> {
    pub fn new(atoms: [AtomId; N], params: P) -> Self {
        Self {
            atoms,
            params,
            modified: None,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms.contains(&atom_id)
    }

    pub fn effective(&self) -> &P {
        self.modified.as_ref().unwrap_or(&self.params)
    }
}

pub type Bond = Term<2, BondParams>;
pub type Angle = Term<3, AngleParams>;
pub type Dihedral = Term<4, Vec<DihedralTerm>>;
pub type Improper = Term<4, ImproperParams>;

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn term_contains_reports_member_atoms_only() {
        let bond = Bond::new(
            [dummy_atom_id(1), dummy_atom_id(2)],
            BondParams { k: 300.0, req: 1.5 },
        );
        assert!(bond.contains(dummy_atom_id(1)));
        assert!(bond.contains(dummy_atom_id(2)));
        assert!(!bond.contains(dummy_atom_id(3)));
    }

    #[test]
    fn effective_prefers_modified_parameters() {
        let mut angle = Angle::new(
            [dummy_atom_id(1), dummy_atom_id(2), dummy_atom_id(3)],
            AngleParams {
                k: 40.0,
                theteq: 109.5,
            },
        );
        assert_eq!(angle.effective().k, 40.0);

        angle.modified = Some(AngleParams {
            k: 10.0,
            theteq: 109.5,
        });
        assert_eq!(angle.effective().k, 10.0);
    }

    #[test]
    fn dihedral_keeps_all_fourier_terms() {
        let dihedral = Dihedral::new(
            [
                dummy_atom_id(1),
                dummy_atom_id(2),
                dummy_atom_id(3),
                dummy_atom_id(4),
            ],
            vec![
                DihedralTerm {
                    phi_k: 0.2,
                    per: 1.0,
                    phase: 0.0,
                },
                DihedralTerm {
                    phi_k: 0.1,
                    per: 3.0,
                    phase: 180.0,
                },
            ],
        );
        assert_eq!(dihedral.effective().len(), 2);
    }
}
