use super::{Mutation, MutationError, check_step, lambda, resolve_atoms};
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::{AngleParams, BondParams, DihedralTerm, ImproperParams, Term};
use std::collections::HashSet;
use tracing::debug;

/// Scales the force constants of every bonded term that involves one of the selected atoms.
///
/// The selected atoms must already carry dummy types, since the scaled parameters are
/// written to the dummy parameter file keyed by type.
#[derive(Debug, Clone)]
pub struct BondedMutation {
    atoms: Vec<String>,
    nr_of_steps: usize,
}

impl BondedMutation {
    pub fn new(atoms: Vec<String>, nr_of_steps: usize) -> Self {
        Self { atoms, nr_of_steps }
    }
}

fn scale_terms<const N: usize, P: Clone>(
    terms: &mut [Term<N, P>],
    selected: &HashSet<AtomId>,
    step: usize,
    scale: impl Fn(&P) -> P,
) -> usize {
    let mut touched = 0;
    for term in terms
        .iter_mut()
        .filter(|t| t.atoms.iter().any(|id| selected.contains(id)))
    {
        term.modified = (step > 0).then(|| scale(&term.params));
        touched += 1;
    }
    touched
}

impl Mutation for BondedMutation {
    fn name(&self) -> &str {
        "bonded"
    }

    fn nr_of_steps(&self) -> usize {
        self.nr_of_steps
    }

    fn mutate(
        &self,
        system: &mut MolecularSystem,
        tlc: &str,
        step: usize,
    ) -> Result<(), MutationError> {
        check_step(self, step)?;
        let ids = resolve_atoms(system, tlc, &self.atoms)?;
        for (&id, name) in ids.iter().zip(&self.atoms) {
            if !system.atom(id).is_some_and(|a| a.is_mutated()) {
                return Err(MutationError::NotMutated { atom: name.clone() });
            }
        }

        let selected: HashSet<AtomId> = ids.into_iter().collect();
        let f = lambda(step, self.nr_of_steps);

        let bonds = scale_terms(system.bonds_mut(), &selected, step, |p: &BondParams| {
            BondParams { k: p.k * f, ..*p }
        });
        let angles = scale_terms(system.angles_mut(), &selected, step, |p: &AngleParams| {
            AngleParams { k: p.k * f, ..*p }
        });
        let dihedrals = scale_terms(
            system.dihedrals_mut(),
            &selected,
            step,
            |p: &Vec<DihedralTerm>| {
                p.iter()
                    .map(|t| DihedralTerm {
                        phi_k: t.phi_k * f,
                        ..*t
                    })
                    .collect()
            },
        );
        let impropers = scale_terms(
            system.impropers_mut(),
            &selected,
            step,
            |p: &ImproperParams| ImproperParams {
                psi_k: p.psi_k * f,
                ..*p
            },
        );
        debug!(
            bonds,
            angles, dihedrals, impropers, lambda = f, "Scaled bonded force constants"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mutation::steric::StericMutation;
    use crate::core::mutation::test_support::methanol_in_water;

    fn mutated_methanol() -> MolecularSystem {
        let mut system = methanol_in_water();
        StericMutation::new(vec!["H1".into()], 2)
            .mutate(&mut system, "MOL", 1)
            .unwrap();
        system
    }

    #[test]
    fn requires_dummy_atoms() {
        let mut system = methanol_in_water();
        let err = BondedMutation::new(vec!["H1".into()], 3)
            .mutate(&mut system, "MOL", 1)
            .unwrap_err();
        assert_eq!(err, MutationError::NotMutated { atom: "H1".into() });
    }

    #[test]
    fn scales_only_terms_touching_selected_atoms() {
        let mut system = mutated_methanol();
        BondedMutation::new(vec!["H1".into()], 3)
            .mutate(&mut system, "MOL", 1)
            .unwrap();

        let bonds = system.bonds();
        assert!(bonds[0].modified.is_none());
        assert_eq!(bonds[1].effective(), &BondParams { k: 272.5, req: 0.96 });
        assert!(bonds[2].modified.is_none());
        assert_eq!(system.angles()[0].effective().k, 25.0);
        assert_eq!(system.dihedrals()[0].effective()[0].phi_k, 0.09);
        assert_eq!(system.impropers()[0].effective().psi_k, 5.0);
    }

    #[test]
    fn base_parameters_are_never_changed() {
        let mut system = mutated_methanol();
        let mutation = BondedMutation::new(vec!["H1".into()], 3);
        mutation.mutate(&mut system, "MOL", 1).unwrap();
        mutation.mutate(&mut system, "MOL", 2).unwrap();
        assert_eq!(system.bonds()[1].params.k, 545.0);
        assert_eq!(system.bonds()[1].effective().k, 0.0);
    }

    #[test]
    fn step_zero_clears_overrides() {
        let mut system = mutated_methanol();
        let mutation = BondedMutation::new(vec!["H1".into()], 3);
        mutation.mutate(&mut system, "MOL", 2).unwrap();
        mutation.mutate(&mut system, "MOL", 0).unwrap();
        assert!(system.bonds().iter().all(|b| b.modified.is_none()));
    }
}
