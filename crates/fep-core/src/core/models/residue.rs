use super::ids::AtomId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                      // Residue sequence number from source file
    pub name: String,                       // Residue name (e.g., "LIG", "TIP3")
    pub segment: String,                    // Segment identifier used by PSF/PDB writers
    pub(crate) atoms: Vec<AtomId>,          // Atoms in file order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(number: isize, name: &str, segment: &str) -> Self {
        Self {
            number,
            name: name.to_string(),
            segment: segment.to_string(),
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// Whether this residue carries the given three-letter tag (case-insensitive).
    pub fn is_tagged(&self, tlc: &str) -> bool {
        self.name.eq_ignore_ascii_case(tlc)
    }
}
