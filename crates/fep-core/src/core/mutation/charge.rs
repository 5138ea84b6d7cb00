use super::{Mutation, MutationError, check_step, lambda, resolve_atoms};
use crate::core::models::system::MolecularSystem;
use tracing::debug;

/// Scales the partial charges of the selected atoms linearly to zero.
#[derive(Debug, Clone)]
pub struct ChargeMutation {
    atoms: Vec<String>,
    nr_of_steps: usize,
}

impl ChargeMutation {
    pub fn new(atoms: Vec<String>, nr_of_steps: usize) -> Self {
        Self { atoms, nr_of_steps }
    }
}

impl Mutation for ChargeMutation {
    fn name(&self) -> &str {
        "charge"
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
        let scale = lambda(step, self.nr_of_steps);
        for id in resolve_atoms(system, tlc, &self.atoms)? {
            if let Some(atom) = system.atom_mut(id) {
                atom.charge = atom.initial_charge * scale;
                debug!(atom = %atom.name, charge = atom.charge, "Scaled charge");
            }
        }
        Ok(())
    }
}
