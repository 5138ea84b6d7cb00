use super::ids::ResidueId;
use nalgebra::Point3;

/// Lennard-Jones parameters in the CHARMM convention.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LennardJones {
    /// Well depth in kcal/mol (negative by CHARMM convention).
    pub epsilon: f64,
    /// Half of the minimum-energy separation (Rmin/2) in Angstroms.
    pub rmin: f64,
}

impl LennardJones {
    pub fn new(epsilon: f64, rmin: f64) -> Self {
        Self { epsilon, rmin }
    }
}

/// The alchemical status of an atom's force field type.
///
/// The variant is resolved once, when a mutation is applied, so that writers never
/// have to infer from side information whether an atom took part in a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomTypeState {
    /// The atom still carries the type it was loaded with.
    Unmodified { atom_type: String },
    /// The atom was switched to a new (usually dummy) type by a mutation.
    Mutated {
        original_type: String,
        current_type: String,
    },
}

impl AtomTypeState {
    /// The type the force field currently sees for this atom.
    pub fn current(&self) -> &str {
        match self {
            Self::Unmodified { atom_type } => atom_type,
            Self::Mutated { current_type, .. } => current_type,
        }
    }

    /// The type the atom had before any mutation was applied.
    pub fn original(&self) -> &str {
        match self {
            Self::Unmodified { atom_type } => atom_type,
            Self::Mutated { original_type, .. } => original_type,
        }
    }

    pub fn is_mutated(&self) -> bool {
        matches!(self, Self::Mutated { .. })
    }
}

/// A single atom of a topology together with the parameters the writers need.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "C1", "H12").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The force field type, tagged with its alchemical status.
    pub type_state: AtomTypeState,
    /// The current partial charge in elementary charge units.
    pub charge: f64,
    /// The charge the atom was loaded with; mutations scale from this value.
    pub initial_charge: f64,
    /// The atomic mass in amu.
    pub mass: f64,
    /// The Lennard-Jones parameters of the original atom type.
    pub lj: LennardJones,
    /// Lennard-Jones parameters overriding `lj` for the current (mutated) type.
    pub modified_lj: Option<LennardJones>,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates an unmodified atom of the given type with zero charge and mass.
    pub fn new(name: &str, atom_type: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            type_state: AtomTypeState::Unmodified {
                atom_type: atom_type.to_string(),
            },
            charge: 0.0,
            initial_charge: 0.0,
            mass: 0.0,
            lj: LennardJones::default(),
            modified_lj: None,
            position,
        }
    }

    /// Sets both the current and the initial charge.
    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self.initial_charge = charge;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_lj(mut self, lj: LennardJones) -> Self {
        self.lj = lj;
        self
    }

    pub fn atom_type(&self) -> &str {
        self.type_state.current()
    }

    pub fn is_mutated(&self) -> bool {
        self.type_state.is_mutated()
    }

    /// The Lennard-Jones parameters in effect, falling back to the base type.
    pub fn effective_lj(&self) -> LennardJones {
        self.modified_lj.unwrap_or(self.lj)
    }

    /// Switches the atom to `new_type`, remembering the type it had on load.
    pub fn mutate_type(&mut self, new_type: &str) {
        let original_type = self.type_state.original().to_string();
        self.type_state = AtomTypeState::Mutated {
            original_type,
            current_type: new_type.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Atom {
        Atom::new("C1", "CG331", ResidueId::default(), Point3::origin())
            .with_charge(-0.27)
            .with_mass(12.011)
            .with_lj(LennardJones::new(-0.078, 2.05))
    }

    #[test]
    fn new_atom_is_unmodified_with_given_type() {
        let atom = carbon();
        assert_eq!(atom.atom_type(), "CG331");
        assert!(!atom.is_mutated());
        assert_eq!(atom.initial_charge, -0.27);
        assert!(atom.modified_lj.is_none());
    }

    #[test]
    fn mutate_type_records_original_type() {
        let mut atom = carbon();
        atom.mutate_type("DDX1");
        assert_eq!(
            atom.type_state,
            AtomTypeState::Mutated {
                original_type: "CG331".into(),
                current_type: "DDX1".into(),
            }
        );
        assert_eq!(atom.atom_type(), "DDX1");
    }

    #[test]
    fn repeated_mutation_keeps_first_original_type() {
        let mut atom = carbon();
        atom.mutate_type("DDX1");
        atom.mutate_type("DDX2");
        assert_eq!(atom.type_state.original(), "CG331");
        assert_eq!(atom.type_state.current(), "DDX2");
    }

    #[test]
    fn effective_lj_falls_back_to_base_parameters() {
        let mut atom = carbon();
        assert_eq!(atom.effective_lj(), LennardJones::new(-0.078, 2.05));
        atom.modified_lj = Some(LennardJones::new(0.0, 2.05));
        assert_eq!(atom.effective_lj(), LennardJones::new(0.0, 2.05));
    }
}
