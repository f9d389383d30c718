//! Flat atom/bond storage with an adjacency index.
//!
//! [`GraphStore`] knows nothing about unique ids or handles. It keeps atoms
//! and bonds in insertion order, compacts on removal the way `Vec::remove`
//! does, and keeps `adjacency[atom]` (the indices of incident bonds, ascending)
//! in step with every edit.

use crate::traits::{
    HasAtomicNum, HasBondOrder, HasFormalCharge, HasPosition2D, HasPosition3D, HasSelection,
};

/// Per-atom attributes.
///
/// # Examples
///
/// ```
/// use molgraph::AtomData;
///
/// let oxygen = AtomData {
///     atomic_num: 8,
///     ..AtomData::default()
/// };
/// assert_eq!(oxygen.position_3d, [0.0; 3]);
/// assert!(oxygen.position_2d.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomData {
    /// Atomic number. `0` is a dummy atom (centroids, attachment points).
    pub atomic_num: u8,
    /// Cartesian position in ångström.
    pub position_3d: [f64; 3],
    /// Depiction coordinates, when a 2D layout exists.
    pub position_2d: Option<[f64; 2]>,
    pub formal_charge: i8,
    pub selected: bool,
}

impl AtomData {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }
}

/// Per-bond attributes. Endpoints are structural and live in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondData {
    pub order: u8,
}

impl Default for BondData {
    fn default() -> Self {
        Self { order: 1 }
    }
}

impl HasAtomicNum for AtomData {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl HasFormalCharge for AtomData {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl HasPosition2D for AtomData {
    fn position_2d(&self) -> Option<[f64; 2]> {
        self.position_2d
    }
    fn set_position_2d(&mut self, pos: Option<[f64; 2]>) {
        self.position_2d = pos;
    }
}

impl HasPosition3D for AtomData {
    fn position_3d(&self) -> [f64; 3] {
        self.position_3d
    }
    fn set_position_3d(&mut self, pos: [f64; 3]) {
        self.position_3d = pos;
    }
}

impl HasSelection for AtomData {
    fn is_selected(&self) -> bool {
        self.selected
    }
    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

impl HasBondOrder for BondData {
    fn bond_order(&self) -> u8 {
        self.order
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStore {
    atoms: Vec<AtomData>,
    bonds: Vec<BondData>,
    bond_pairs: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn atom(&self, index: usize) -> Option<&AtomData> {
        self.atoms.get(index)
    }

    pub fn atom_mut(&mut self, index: usize) -> Option<&mut AtomData> {
        self.atoms.get_mut(index)
    }

    pub fn bond(&self, index: usize) -> Option<&BondData> {
        self.bonds.get(index)
    }

    pub fn bond_mut(&mut self, index: usize) -> Option<&mut BondData> {
        self.bonds.get_mut(index)
    }

    pub fn atoms(&self) -> &[AtomData] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[BondData] {
        &self.bonds
    }

    /// Endpoints of bond `index`, in the order they were given.
    pub fn bond_pair(&self, index: usize) -> Option<(usize, usize)> {
        self.bond_pairs.get(index).copied()
    }

    pub fn bond_pairs(&self) -> &[(usize, usize)] {
        &self.bond_pairs
    }

    /// Indices of bonds incident to `atom`, ascending. Empty for an
    /// out-of-range atom.
    pub fn incident_bonds(&self, atom: usize) -> &[usize] {
        match self.adjacency.get(atom) {
            Some(incident) => incident,
            None => &[],
        }
    }

    pub fn push_atom(&mut self, data: AtomData) -> usize {
        self.atoms.push(data);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// Append a bond between two in-range atoms.
    pub fn push_bond(&mut self, a: usize, b: usize, data: BondData) -> usize {
        debug_assert!(a < self.atoms.len() && b < self.atoms.len());
        let index = self.bonds.len();
        self.bonds.push(data);
        self.bond_pairs.push((a, b));
        self.adjacency[a].push(index);
        if a != b {
            self.adjacency[b].push(index);
        }
        index
    }

    /// Lowest-index bond joining `a` and `b`, in either direction.
    pub fn find_bond(&self, a: usize, b: usize) -> Option<usize> {
        self.incident_bonds(a).iter().copied().find(|&bond| {
            let (x, y) = self.bond_pairs[bond];
            (x == a && y == b) || (x == b && y == a)
        })
    }

    /// Remove bond `index`, shifting later bonds down one slot.
    pub fn remove_bond_at(&mut self, index: usize) -> Option<BondData> {
        if index >= self.bonds.len() {
            return None;
        }
        let data = self.bonds.remove(index);
        let (a, b) = self.bond_pairs.remove(index);
        self.adjacency[a].retain(|&bond| bond != index);
        if a != b {
            self.adjacency[b].retain(|&bond| bond != index);
        }
        for incident in &mut self.adjacency {
            for bond in incident.iter_mut().filter(|bond| **bond > index) {
                *bond -= 1;
            }
        }
        Some(data)
    }

    /// Remove atom `index`, shifting later atoms down one slot.
    ///
    /// The atom must have no incident bonds; callers remove those first so
    /// no bond is ever left pointing at a vacated slot.
    pub fn remove_atom_at(&mut self, index: usize) -> Option<AtomData> {
        if index >= self.atoms.len() {
            return None;
        }
        debug_assert!(self.adjacency[index].is_empty());
        let data = self.atoms.remove(index);
        self.adjacency.remove(index);
        for (a, b) in &mut self.bond_pairs {
            if *a > index {
                *a -= 1;
            }
            if *b > index {
                *b -= 1;
            }
        }
        Some(data)
    }

    /// Append every atom and bond of `other`, offsetting bond endpoints by
    /// the current atom count. Returns the first new atom and bond indices.
    pub fn extend_from(&mut self, other: &GraphStore) -> (usize, usize) {
        let atom_offset = self.atoms.len();
        let bond_offset = self.bonds.len();
        for atom in &other.atoms {
            self.push_atom(atom.clone());
        }
        for (data, &(a, b)) in other.bonds.iter().zip(&other.bond_pairs) {
            self.push_bond(a + atom_offset, b + atom_offset, data.clone());
        }
        (atom_offset, bond_offset)
    }

    pub fn clear_bonds(&mut self) {
        self.bonds.clear();
        self.bond_pairs.clear();
        for incident in &mut self.adjacency {
            incident.clear();
        }
    }

    /// Remove every atom, and with them every bond.
    pub fn clear_atoms(&mut self) {
        self.clear_bonds();
        self.atoms.clear();
        self.adjacency.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> GraphStore {
        let mut store = GraphStore::new();
        for z in 0..n {
            store.push_atom(AtomData::new(z as u8 + 1));
        }
        for i in 1..n {
            store.push_bond(i - 1, i, BondData::default());
        }
        store
    }

    #[test]
    fn adjacency_tracks_pushes() {
        let store = chain(3);
        assert_eq!(store.incident_bonds(0), &[0]);
        assert_eq!(store.incident_bonds(1), &[0, 1]);
        assert_eq!(store.incident_bonds(2), &[1]);
        assert!(store.incident_bonds(9).is_empty());
    }

    #[test]
    fn find_bond_is_symmetric() {
        let store = chain(3);
        assert_eq!(store.find_bond(0, 1), Some(0));
        assert_eq!(store.find_bond(1, 0), Some(0));
        assert_eq!(store.find_bond(0, 2), None);
    }

    #[test]
    fn find_bond_prefers_lowest_parallel_bond() {
        let mut store = chain(2);
        store.push_bond(1, 0, BondData { order: 2 });
        assert_eq!(store.find_bond(0, 1), Some(0));
        store.remove_bond_at(0);
        assert_eq!(store.find_bond(1, 0), Some(0));
        assert_eq!(store.bond(0).map(|b| b.order), Some(2));
    }

    #[test]
    fn remove_bond_compacts_adjacency() {
        let mut store = chain(4);
        assert_eq!(store.remove_bond_at(1), Some(BondData::default()));
        assert_eq!(store.bond_count(), 2);
        assert_eq!(store.bond_pair(1), Some((2, 3)));
        assert_eq!(store.incident_bonds(1), &[0]);
        assert_eq!(store.incident_bonds(2), &[1]);
        assert_eq!(store.incident_bonds(3), &[1]);
        assert_eq!(store.remove_bond_at(5), None);
    }

    #[test]
    fn remove_atom_shifts_bond_endpoints() {
        let mut store = chain(3);
        store.push_atom(AtomData::new(9));
        store.remove_bond_at(0);
        store.remove_bond_at(0);
        store.push_bond(2, 3, BondData::default());
        let removed = store.remove_atom_at(0);
        assert_eq!(removed.map(|a| a.atomic_num), Some(1));
        assert_eq!(store.atom_count(), 3);
        assert_eq!(store.bond_pair(0), Some((1, 2)));
        assert_eq!(store.incident_bonds(1), &[0]);
        assert_eq!(store.atom(2).map(|a| a.atomic_num), Some(9));
    }

    #[test]
    fn extend_offsets_endpoints() {
        let mut store = chain(2);
        let (atom_offset, bond_offset) = store.extend_from(&chain(3));
        assert_eq!((atom_offset, bond_offset), (2, 1));
        assert_eq!(store.atom_count(), 5);
        assert_eq!(store.bond_pairs(), &[(0, 1), (2, 3), (3, 4)]);
        assert_eq!(store.incident_bonds(3), &[1, 2]);
    }

    #[test]
    fn clearing() {
        let mut store = chain(3);
        store.clear_bonds();
        assert_eq!(store.bond_count(), 0);
        assert_eq!(store.atom_count(), 3);
        assert!(store.incident_bonds(1).is_empty());
        store.clear_atoms();
        assert_eq!(store.atom_count(), 0);
    }
}
