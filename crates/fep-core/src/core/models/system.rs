use super::atom::Atom;
use super::ids::{AtomId, ResidueId};
use super::residue::Residue;
use super::topology::{
    Angle, AngleParams, Bond, BondParams, Dihedral, DihedralTerm, Improper, ImproperParams, Term,
};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

/// A complete topology: atoms grouped into residues plus all bonded terms.
///
/// Atom order is the order in which atoms were added to their residues, with
/// residues visited in insertion order. Writers rely on this order for serials.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Residues in insertion order.
    residue_order: Vec<ResidueId>,
    /// Lookup map for finding residues by segment and residue number.
    residue_id_map: HashMap<(String, isize), ResidueId>,
    bonds: Vec<Bond>,
    angles: Vec<Angle>,
    dihedrals: Vec<Dihedral>,
    impropers: Vec<Improper>,
    /// Edge length of the cubic periodic cell in Angstroms, if any.
    box_length: Option<f64>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Returns an iterator over all residues in insertion order.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residue_order
            .iter()
            .filter_map(|&id| self.residues.get(id).map(|r| (id, r)))
    }

    /// Returns all atom IDs in file order (residue by residue).
    pub fn ordered_atom_ids(&self) -> Vec<AtomId> {
        self.residues_iter()
            .flat_map(|(_, residue)| residue.atoms().iter().copied())
            .collect()
    }

    /// Adds a new residue or returns the existing one with the same segment and number.
    pub fn add_residue(&mut self, segment: &str, number: isize, name: &str) -> ResidueId {
        let key = (segment.to_string(), number);
        if let Some(&id) = self.residue_id_map.get(&key) {
            return id;
        }
        let id = self.residues.insert(Residue::new(number, name, segment));
        self.residue_order.push(id);
        self.residue_id_map.insert(key, id);
        id
    }

    /// Adds an atom to a residue.
    ///
    /// Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        atom.residue_id = residue_id;
        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        self.residues.get_mut(residue_id)?.add_atom(&name, atom_id);
        Some(atom_id)
    }

    fn check_atoms<const N: usize>(&self, atoms: &[AtomId; N]) -> Option<()> {
        atoms
            .iter()
            .all(|&id| self.atoms.contains_key(id))
            .then_some(())
    }

    /// Adds a bond. Returns `None` if either atom does not exist.
    pub fn add_bond(&mut self, atoms: [AtomId; 2], params: BondParams) -> Option<()> {
        self.check_atoms(&atoms)?;
        self.bonds.push(Term::new(atoms, params));
        Some(())
    }

    pub fn add_angle(&mut self, atoms: [AtomId; 3], params: AngleParams) -> Option<()> {
        self.check_atoms(&atoms)?;
        self.angles.push(Term::new(atoms, params));
        Some(())
    }

    pub fn add_dihedral(&mut self, atoms: [AtomId; 4], terms: Vec<DihedralTerm>) -> Option<()> {
        self.check_atoms(&atoms)?;
        self.dihedrals.push(Term::new(atoms, terms));
        Some(())
    }

    pub fn add_improper(&mut self, atoms: [AtomId; 4], params: ImproperParams) -> Option<()> {
        self.check_atoms(&atoms)?;
        self.impropers.push(Term::new(atoms, params));
        Some(())
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    pub fn dihedrals(&self) -> &[Dihedral] {
        &self.dihedrals
    }

    pub fn impropers(&self) -> &[Improper] {
        &self.impropers
    }

    pub fn bonds_mut(&mut self) -> &mut [Bond] {
        &mut self.bonds
    }

    pub fn angles_mut(&mut self) -> &mut [Angle] {
        &mut self.angles
    }

    pub fn dihedrals_mut(&mut self) -> &mut [Dihedral] {
        &mut self.dihedrals
    }

    pub fn impropers_mut(&mut self) -> &mut [Improper] {
        &mut self.impropers
    }

    pub fn box_length(&self) -> Option<f64> {
        self.box_length
    }

    pub fn set_box_length(&mut self, length: Option<f64>) {
        self.box_length = length;
    }

    /// Finds an atom by name inside the first residue carrying the tag `tlc`.
    pub fn find_tagged_atom(&self, tlc: &str, atom_name: &str) -> Option<AtomId> {
        self.residues_iter()
            .filter(|(_, residue)| residue.is_tagged(tlc))
            .find_map(|(_, residue)| residue.get_atom_id_by_name(atom_name))
    }

    /// Returns a read-only view restricted to the residues tagged `tlc`.
    pub fn view(&self, tlc: &str) -> ResidueView<'_> {
        let atom_ids: Vec<AtomId> = self
            .residues_iter()
            .filter(|(_, residue)| residue.is_tagged(tlc))
            .flat_map(|(_, residue)| residue.atoms().iter().copied())
            .collect();
        let members = atom_ids.iter().copied().collect();
        ResidueView {
            system: self,
            atom_ids,
            members,
        }
    }
}

/// A residue-scoped selection of a [`MolecularSystem`].
///
/// Bonded terms are part of the view only if every atom of the term lies inside it.
pub struct ResidueView<'a> {
    system: &'a MolecularSystem,
    atom_ids: Vec<AtomId>,
    members: HashSet<AtomId>,
}

impl<'a> ResidueView<'a> {
    pub fn is_empty(&self) -> bool {
        self.atom_ids.is_empty()
    }

    pub fn atom_ids(&self) -> &[AtomId] {
        &self.atom_ids
    }

    pub fn atoms(&self) -> impl Iterator<Item = &'a Atom> + '_ {
        self.atom_ids
            .iter()
            .filter_map(move |&id| self.system.atom(id))
    }

    pub fn atom(&self, id: AtomId) -> Option<&'a Atom> {
        self.system.atom(id)
    }

    fn inside<const N: usize, P>(&self, term: &Term<N, P>) -> bool {
        term.atoms.iter().all(|id| self.members.contains(id))
    }

    pub fn bonds(&self) -> impl Iterator<Item = &'a Bond> + '_ {
        self.system.bonds().iter().filter(move |t| self.inside(*t))
    }

    pub fn angles(&self) -> impl Iterator<Item = &'a Angle> + '_ {
        self.system.angles().iter().filter(move |t| self.inside(*t))
    }

    pub fn dihedrals(&self) -> impl Iterator<Item = &'a Dihedral> + '_ {
        self.system.dihedrals().iter().filter(move |t| self.inside(*t))
    }

    pub fn impropers(&self) -> impl Iterator<Item = &'a Improper> + '_ {
        self.system.impropers().iter().filter(move |t| self.inside(*t))
    }

    /// Whether any atom of the term carries a mutated type.
    pub fn touches_mutated<const N: usize, P>(&self, term: &Term<N, P>) -> bool {
        term.atoms
            .iter()
            .filter_map(|&id| self.system.atom(id))
            .any(Atom::is_mutated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    struct TestRefs {
        c1: AtomId,
        c2: AtomId,
        ow: AtomId,
    }

    fn create_test_system() -> (MolecularSystem, TestRefs) {
        let mut system = MolecularSystem::new();
        let lig = system.add_residue("HETA", 1, "LIG");
        let wat = system.add_residue("SOLV", 1, "TIP3");
        let c1 = system
            .add_atom_to_residue(lig, Atom::new("C1", "CG331", lig, Point3::origin()))
            .unwrap();
        let c2 = system
            .add_atom_to_residue(lig, Atom::new("C2", "CG321", lig, Point3::new(1.5, 0.0, 0.0)))
            .unwrap();
        let ow = system
            .add_atom_to_residue(wat, Atom::new("OH2", "OT", wat, Point3::new(5.0, 0.0, 0.0)))
            .unwrap();
        system
            .add_bond([c1, c2], BondParams { k: 222.5, req: 1.528 })
            .unwrap();
        system
            .add_bond([c2, ow], BondParams { k: 1.0, req: 3.0 })
            .unwrap();
        (system, TestRefs { c1, c2, ow })
    }

    #[test]
    fn add_residue_is_idempotent_for_same_segment_and_number() {
        let mut system = MolecularSystem::new();
        let a = system.add_residue("HETA", 1, "LIG");
        let b = system.add_residue("HETA", 1, "LIG");
        let c = system.add_residue("SOLV", 1, "TIP3");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(system.residues_iter().count(), 2);
    }

    #[test]
    fn add_atom_to_missing_residue_returns_none() {
        let mut system = MolecularSystem::new();
        let mut other = MolecularSystem::new();
        let foreign = other.add_residue("X", 1, "X");
        let atom = Atom::new("C1", "C", foreign, Point3::origin());
        assert!(system.add_atom_to_residue(foreign, atom).is_none());
    }

    #[test]
    fn ordered_atom_ids_follow_residue_then_atom_order() {
        let (system, refs) = create_test_system();
        assert_eq!(system.ordered_atom_ids(), vec![refs.c1, refs.c2, refs.ow]);
        assert_eq!(system.atom_count(), 3);
    }

    #[test]
    fn find_tagged_atom_searches_only_tagged_residues() {
        let (system, refs) = create_test_system();
        assert_eq!(system.find_tagged_atom("LIG", "C2"), Some(refs.c2));
        assert_eq!(system.find_tagged_atom("LIG", "OH2"), None);
    }

    #[test]
    fn view_excludes_terms_leaving_the_residue() {
        let (system, refs) = create_test_system();
        let view = system.view("LIG");
        assert_eq!(view.atom_ids(), &[refs.c1, refs.c2]);
        assert_eq!(view.bonds().count(), 1);
        assert!(system.view("UNK").is_empty());
    }

    #[test]
    fn touches_mutated_detects_any_mutated_member() {
        let (mut system, refs) = create_test_system();
        assert!(!system.view("LIG").touches_mutated(&system.bonds()[0]));
        system.atom_mut(refs.c2).unwrap().mutate_type("DDX");
        let view = system.view("LIG");
        assert!(view.touches_mutated(&system.bonds()[0]));
    }

    #[test]
    fn add_bond_rejects_unknown_atoms() {
        let (mut system, refs) = create_test_system();
        let stranger = AtomId::from(slotmap::KeyData::from_ffi(u32::MAX as u64 - 1));
        assert!(system.add_bond([refs.c1, stranger], BondParams::default()).is_none());
        assert_eq!(system.bonds().len(), 2);
    }
}
