//! # Mutation Module
//!
//! Alchemical mutations that move a ligand topology from one intermediate state to the next.
//!
//! A [`Mutation`] acts on the atoms of the residue carrying a three-letter tag and is
//! applied for a given step `s` of `nr_of_steps`. The coupling parameter at that step is
//! `λ = 1 − s / (nr_of_steps − 1)`, so step 0 is the unchanged end state and the last
//! step is fully decoupled. Every mutation computes absolute values from the initial
//! parameters stored on the topology, so applying the same step twice has no further effect.
//!
//! - [`charge::ChargeMutation`] scales partial charges to zero
//! - [`steric::StericMutation`] switches atoms to dummy types and scales their well depth
//! - [`bonded::BondedMutation`] scales force constants of bonded terms on dummy atoms

pub mod bonded;
pub mod charge;
pub mod steric;

use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("Atom '{atom}' not found in residue '{tlc}'")]
    UnknownAtom { tlc: String, atom: String },

    #[error("Atom '{atom}' must be mutated to a dummy type before its bonded terms can be scaled")]
    NotMutated { atom: String },

    #[error("Step {step} is out of range for mutation '{mutation}' with {nr_of_steps} steps")]
    StepOutOfRange {
        mutation: String,
        step: usize,
        nr_of_steps: usize,
    },

    #[error("Mutation '{0}' selects no atoms")]
    EmptySelection(String),
}

/// An operation moving a structure from one alchemical state towards the next.
pub trait Mutation: Send + Sync {
    /// A short, human-readable identifier (e.g., "charge").
    fn name(&self) -> &str;

    /// The number of discrete sub-steps, including the unchanged step 0.
    fn nr_of_steps(&self) -> usize;

    /// Applies step `step` of this mutation to the residue tagged `tlc` in `system`.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] if the step is out of range or a selected atom is
    /// missing or in the wrong alchemical state.
    fn mutate(
        &self,
        system: &mut MolecularSystem,
        tlc: &str,
        step: usize,
    ) -> Result<(), MutationError>;
}

/// The coupling parameter at `step` of a mutation with `nr_of_steps` steps.
pub fn lambda(step: usize, nr_of_steps: usize) -> f64 {
    if nr_of_steps <= 1 {
        return 1.0;
    }
    1.0 - step as f64 / (nr_of_steps - 1) as f64
}

pub(crate) fn check_step(
    mutation: &dyn Mutation,
    step: usize,
) -> Result<(), MutationError> {
    if step >= mutation.nr_of_steps() {
        return Err(MutationError::StepOutOfRange {
            mutation: mutation.name().to_string(),
            step,
            nr_of_steps: mutation.nr_of_steps(),
        });
    }
    Ok(())
}

pub(crate) fn resolve_atoms(
    system: &MolecularSystem,
    tlc: &str,
    names: &[String],
) -> Result<Vec<AtomId>, MutationError> {
    names
        .iter()
        .map(|name| {
            system
                .find_tagged_atom(tlc, name)
                .ok_or_else(|| MutationError::UnknownAtom {
                    tlc: tlc.to_string(),
                    atom: name.clone(),
                })
        })
        .collect()
}

/// A serializable description of a mutation, as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum MutationSpec {
    Charge { atoms: Vec<String>, steps: usize },
    Steric { atoms: Vec<String>, steps: usize },
    Bonded { atoms: Vec<String>, steps: usize },
}

impl MutationSpec {
    pub fn into_mutation(self) -> Result<Box<dyn Mutation>, MutationError> {
        let (kind, atoms) = match &self {
            Self::Charge { atoms, .. } => ("charge", atoms),
            Self::Steric { atoms, .. } => ("steric", atoms),
            Self::Bonded { atoms, .. } => ("bonded", atoms),
        };
        if atoms.is_empty() {
            return Err(MutationError::EmptySelection(kind.to_string()));
        }
        Ok(match self {
            Self::Charge { atoms, steps } => Box::new(charge::ChargeMutation::new(atoms, steps)),
            Self::Steric { atoms, steps } => Box::new(steric::StericMutation::new(atoms, steps)),
            Self::Bonded { atoms, steps } => Box::new(bonded::BondedMutation::new(atoms, steps)),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::models::atom::{Atom, LennardJones};
    use crate::core::models::system::MolecularSystem;
    use crate::core::models::topology::{AngleParams, BondParams, DihedralTerm, ImproperParams};
    use nalgebra::Point3;

    /// A small ligand `MOL` (C1-O1-H1, plus H2 on C1) next to one water.
    pub fn methanol_in_water() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let lig = system.add_residue("HETA", 1, "MOL");
        let mut add = |name: &str, ty: &str, q: f64, lj: LennardJones| {
            system
                .add_atom_to_residue(
                    lig,
                    Atom::new(name, ty, lig, Point3::origin())
                        .with_charge(q)
                        .with_mass(12.0)
                        .with_lj(lj),
                )
                .unwrap()
        };
        let c1 = add("C1", "CG331", -0.04, LennardJones::new(-0.078, 2.05));
        let o1 = add("O1", "OG311", -0.65, LennardJones::new(-0.192, 1.765));
        let h1 = add("H1", "HGP1", 0.42, LennardJones::new(-0.046, 0.2245));
        let h2 = add("H2", "HGA3", 0.09, LennardJones::new(-0.024, 1.34));
        let wat = system.add_residue("SOLV", 1, "TIP3");
        system
            .add_atom_to_residue(
                wat,
                Atom::new("OH2", "OT", wat, Point3::origin()).with_charge(-0.834),
            )
            .unwrap();

        system.add_bond([c1, o1], BondParams { k: 428.0, req: 1.42 }).unwrap();
        system.add_bond([o1, h1], BondParams { k: 545.0, req: 0.96 }).unwrap();
        system.add_bond([c1, h2], BondParams { k: 322.0, req: 1.111 }).unwrap();
        system
            .add_angle([c1, o1, h1], AngleParams { k: 50.0, theteq: 106.0 })
            .unwrap();
        system
            .add_dihedral(
                [h2, c1, o1, h1],
                vec![DihedralTerm { phi_k: 0.18, per: 3.0, phase: 0.0 }],
            )
            .unwrap();
        system
            .add_improper([c1, o1, h1, h2], ImproperParams { psi_k: 10.0, psi_eq: 0.0 })
            .unwrap();
        system
    }
}
