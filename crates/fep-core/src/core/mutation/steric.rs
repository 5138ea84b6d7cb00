use super::{Mutation, MutationError, check_step, lambda, resolve_atoms};
use crate::core::models::atom::{AtomTypeState, LennardJones};
use crate::core::models::system::MolecularSystem;
use tracing::debug;

/// Turns the selected atoms into dummy atoms with a vanishing Lennard-Jones well depth.
///
/// From step 1 on, every selected atom carries its own dummy type `DD<k>`, where `k` is the
/// 1-based position of the atom in its residue, so each dummy keeps the radius of the type
/// it replaced. Step 0 restores the original types.
#[derive(Debug, Clone)]
pub struct StericMutation {
    atoms: Vec<String>,
    nr_of_steps: usize,
}

impl StericMutation {
    pub fn new(atoms: Vec<String>, nr_of_steps: usize) -> Self {
        Self { atoms, nr_of_steps }
    }
}

pub fn dummy_type_name(position_in_residue: usize) -> String {
    format!("DD{}", position_in_residue + 1)
}

impl Mutation for StericMutation {
    fn name(&self) -> &str {
        "steric"
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
        let residue_order = system.view(tlc).atom_ids().to_vec();
        let scale = lambda(step, self.nr_of_steps);

        for id in ids {
            let position = residue_order.iter().position(|&a| a == id).unwrap_or(0);
            let Some(atom) = system.atom_mut(id) else {
                continue;
            };
            if step == 0 {
                atom.type_state = AtomTypeState::Unmodified {
                    atom_type: atom.type_state.original().to_string(),
                };
                atom.modified_lj = None;
                continue;
            }
            atom.mutate_type(&dummy_type_name(position));
            // Adding 0.0 turns a negative zero into a positive one.
            atom.modified_lj = Some(LennardJones::new(
                atom.lj.epsilon * scale + 0.0,
                atom.lj.rmin,
            ));
            debug!(
                atom = %atom.name,
                dummy_type = atom.atom_type(),
                epsilon = atom.lj.epsilon * scale,
                "Scaled Lennard-Jones well depth"
            );
        }
        Ok(())
    }
}
