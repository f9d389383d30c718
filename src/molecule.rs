//! The editable molecule.
//!
//! A [`Molecule`] owns a [`GraphStore`] (atoms, bonds, adjacency), one
//! [`IdentityTable`] per element space, the mesh cache and the metadata map.
//! Structural edits compact storage, so positional handles move; unique ids
//! never do.
//!
//! # Copies reset identity
//!
//! Cloning a molecule (and [`Clone::clone_from`], which is assignment) does
//! **not** carry unique ids over. The copy numbers its atoms and bonds
//! `0..n` in storage order, whatever ids the source had accumulated through
//! removals and restores. Code that keeps unique ids across a copy must map
//! them through storage indices itself.
//!
//! ```
//! use molgraph::{Molecule, UniqueId};
//!
//! let mut mol = Molecule::new();
//! let c = mol.add_atom(6);
//! mol.add_atom(8);
//! mol.remove_atom(c);
//! let o = mol.atom(0).unwrap();
//! assert_eq!(mol.atom_unique_id(o), Some(UniqueId::new(1)));
//!
//! let copy = mol.clone();
//! let o = copy.atom(0).unwrap();
//! assert_eq!(copy.atom_unique_id(o), Some(UniqueId::new(0)));
//! ```

use std::fmt;

use tracing::{debug, trace, warn};

use crate::changes::{ChangeSink, MoleculeChanges};
use crate::element;
use crate::error::{ElementKind, GraphError};
use crate::handle::{Atom, Bond, MoleculeId, UniqueId};
use crate::identity::IdentityTable;
use crate::mesh::Mesh;
use crate::store::{AtomData, BondData, GraphStore};
use crate::traits::{HasAtomicNum, HasPosition3D, HasSelection};
use crate::variant::{DataMap, Variant};

pub struct Molecule {
    id: MoleculeId,
    store: GraphStore,
    atom_ids: IdentityTable,
    bond_ids: IdentityTable,
    meshes: Vec<Mesh>,
    data: DataMap,
    pending: MoleculeChanges,
}

impl Molecule {
    pub fn new() -> Self {
        Self {
            id: MoleculeId::next(),
            store: GraphStore::new(),
            atom_ids: IdentityTable::new(),
            bond_ids: IdentityTable::new(),
            meshes: Vec::new(),
            data: DataMap::new(),
            pending: MoleculeChanges::empty(),
        }
    }

    /// Token stamped into every handle this molecule hands out.
    pub fn id(&self) -> MoleculeId {
        self.id
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn is_empty(&self) -> bool {
        self.store.atom_count() == 0
    }

    /// Number of atoms.
    pub fn size(&self) -> usize {
        self.store.atom_count()
    }

    pub fn atom_count(&self) -> usize {
        self.store.atom_count()
    }

    pub fn bond_count(&self) -> usize {
        self.store.bond_count()
    }

    // ---- Handles ----

    fn atom_slot(&self, atom: Atom) -> Option<usize> {
        (atom.owner() == self.id && atom.index() < self.store.atom_count()).then_some(atom.index())
    }

    fn bond_slot(&self, bond: Bond) -> Option<usize> {
        (bond.owner() == self.id && bond.index() < self.store.bond_count()).then_some(bond.index())
    }

    fn require_atom(&self, atom: Atom) -> Result<usize, GraphError> {
        self.atom_slot(atom).ok_or(GraphError::InvalidHandle {
            kind: ElementKind::Atom,
            index: atom.index(),
        })
    }

    fn require_bond(&self, bond: Bond) -> Result<usize, GraphError> {
        self.bond_slot(bond).ok_or(GraphError::InvalidHandle {
            kind: ElementKind::Bond,
            index: bond.index(),
        })
    }

    /// Whether `atom` was produced by this molecule and is still in range.
    pub fn is_valid_atom(&self, atom: Atom) -> bool {
        self.atom_slot(atom).is_some()
    }

    pub fn is_valid_bond(&self, bond: Bond) -> bool {
        self.bond_slot(bond).is_some()
    }

    pub fn atom(&self, index: usize) -> Option<Atom> {
        (index < self.store.atom_count()).then(|| Atom::new(self.id, index))
    }

    pub fn bond(&self, index: usize) -> Option<Bond> {
        (index < self.store.bond_count()).then(|| Bond::new(self.id, index))
    }

    /// Every atom, in storage order.
    pub fn atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        let id = self.id;
        (0..self.store.atom_count()).map(move |index| Atom::new(id, index))
    }

    /// Every bond, in storage order.
    pub fn all_bonds(&self) -> impl Iterator<Item = Bond> + '_ {
        let id = self.id;
        (0..self.store.bond_count()).map(move |index| Bond::new(id, index))
    }

    // ---- Structural edits ----

    fn push_atom(&mut self, data: AtomData, uid: UniqueId) -> Atom {
        let index = self.store.push_atom(data);
        self.atom_ids.bind(uid, index);
        self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::ADDED;
        trace!(index, uid = uid.value(), "added atom");
        Atom::new(self.id, index)
    }

    /// Append an atom at the origin with a freshly allocated unique id.
    pub fn add_atom(&mut self, atomic_num: u8) -> Atom {
        self.add_atom_data(AtomData::new(atomic_num))
    }

    /// Append an atom at `position`.
    pub fn add_atom_at(&mut self, atomic_num: u8, position: [f64; 3]) -> Atom {
        self.add_atom_data(AtomData {
            atomic_num,
            position_3d: position,
            ..AtomData::default()
        })
    }

    pub fn add_atom_data(&mut self, data: AtomData) -> Atom {
        let uid = self.atom_ids.allocate();
        self.push_atom(data, uid)
    }

    /// Append an atom under a caller-chosen unique id, typically one freed
    /// by an earlier removal that an undo step is putting back.
    ///
    /// Fails with [`GraphError::UniqueIdInUse`] if `uid` is live and with
    /// [`GraphError::UniqueIdOutOfRange`] if it exceeds
    /// [`IdentityTable::MAX_ID`].
    pub fn add_atom_with_id(&mut self, atomic_num: u8, uid: UniqueId) -> Result<Atom, GraphError> {
        check_restore_id(&self.atom_ids, ElementKind::Atom, uid)?;
        Ok(self.push_atom(AtomData::new(atomic_num), uid))
    }

    fn check_bond_ends(&self, a: Atom, b: Atom) -> Result<(usize, usize), GraphError> {
        let a = self.require_atom(a)?;
        let b = self.require_atom(b)?;
        if a == b {
            warn!(atom = a, "rejected self bond");
            return Err(GraphError::SelfBond { index: a });
        }
        Ok((a, b))
    }

    fn push_bond(&mut self, a: usize, b: usize, order: u8, uid: UniqueId) -> Bond {
        let index = self.store.push_bond(a, b, BondData { order });
        self.bond_ids.bind(uid, index);
        self.pending |= MoleculeChanges::BONDS | MoleculeChanges::ADDED;
        trace!(index, a, b, order, uid = uid.value(), "added bond");
        Bond::new(self.id, index)
    }

    /// Bond `a` to `b`.
    ///
    /// Parallel bonds between the same pair are accepted; a bond from an atom
    /// to itself is not.
    pub fn add_bond(&mut self, a: Atom, b: Atom, order: u8) -> Result<Bond, GraphError> {
        let (a, b) = self.check_bond_ends(a, b)?;
        let uid = self.bond_ids.allocate();
        Ok(self.push_bond(a, b, order, uid))
    }

    /// [`add_bond`](Molecule::add_bond) under a caller-chosen unique id.
    pub fn add_bond_with_id(
        &mut self,
        a: Atom,
        b: Atom,
        order: u8,
        uid: UniqueId,
    ) -> Result<Bond, GraphError> {
        let (a, b) = self.check_bond_ends(a, b)?;
        check_restore_id(&self.bond_ids, ElementKind::Bond, uid)?;
        Ok(self.push_bond(a, b, order, uid))
    }

    fn remove_bond_at(&mut self, index: usize) -> Option<BondData> {
        let data = self.store.remove_bond_at(index)?;
        let uid = self.bond_ids.remove_index(index);
        self.pending |= MoleculeChanges::BONDS | MoleculeChanges::REMOVED;
        trace!(index, uid = uid.map(UniqueId::value), "removed bond");
        Some(data)
    }

    /// Remove `atom` and every bond incident to it.
    ///
    /// Atoms and bonds stored after the removed ones shift down by one
    /// position; their unique ids follow them. Returns `None` if `atom` does
    /// not resolve.
    pub fn remove_atom(&mut self, atom: Atom) -> Option<AtomData> {
        let index = self.atom_slot(atom)?;
        let incident = self.store.incident_bonds(index).to_vec();
        // Highest first, so the collected indices stay valid while compacting.
        for &bond in incident.iter().rev() {
            self.remove_bond_at(bond);
        }
        let data = self.store.remove_atom_at(index)?;
        let uid = self.atom_ids.remove_index(index);
        self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::REMOVED;
        trace!(
            index,
            uid = uid.map(UniqueId::value),
            cascaded = incident.len(),
            "removed atom"
        );
        Some(data)
    }

    pub fn remove_bond(&mut self, bond: Bond) -> Option<BondData> {
        let index = self.bond_slot(bond)?;
        self.remove_bond_at(index)
    }

    /// Remove every atom and bond, restarting both id spaces at zero.
    pub fn clear_atoms(&mut self) {
        if self.store.bond_count() > 0 {
            self.pending |= MoleculeChanges::BONDS | MoleculeChanges::REMOVED;
        }
        if self.store.atom_count() > 0 {
            self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::REMOVED;
        }
        debug!(
            atoms = self.store.atom_count(),
            bonds = self.store.bond_count(),
            "clearing atoms"
        );
        self.store.clear_atoms();
        self.atom_ids.clear();
        self.bond_ids.clear();
    }

    /// Remove every bond, restarting the bond id space at zero.
    pub fn clear_bonds(&mut self) {
        if self.store.bond_count() > 0 {
            self.pending |= MoleculeChanges::BONDS | MoleculeChanges::REMOVED;
        }
        debug!(bonds = self.store.bond_count(), "clearing bonds");
        self.store.clear_bonds();
        self.bond_ids.clear();
    }

    /// Append a copy of every atom and bond of `other`.
    ///
    /// Appended atoms land at `atom_count()..` with fresh unique ids in this
    /// molecule's id space; appended bond endpoints are offset to match.
    /// `other`'s meshes and metadata are not merged. `label` names the
    /// operation in the log (e.g. "Insert Template").
    pub fn append_molecule(&mut self, other: &Molecule, label: &str) {
        let (atom_offset, bond_offset) = self.store.extend_from(&other.store);
        for index in atom_offset..self.store.atom_count() {
            let uid = self.atom_ids.allocate();
            self.atom_ids.bind(uid, index);
        }
        for index in bond_offset..self.store.bond_count() {
            let uid = self.bond_ids.allocate();
            self.bond_ids.bind(uid, index);
        }
        if other.atom_count() > 0 {
            self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::ADDED;
        }
        if other.bond_count() > 0 {
            self.pending |= MoleculeChanges::BONDS | MoleculeChanges::ADDED;
        }
        debug!(
            label,
            atoms = other.atom_count(),
            bonds = other.bond_count(),
            atom_offset,
            "appended molecule"
        );
    }

    // ---- Queries ----

    /// First (lowest-index) bond joining `a` and `b`, in either order.
    pub fn bond_between(&self, a: Atom, b: Atom) -> Option<Bond> {
        let a = self.atom_slot(a)?;
        let b = self.atom_slot(b)?;
        self.store.find_bond(a, b).map(|index| Bond::new(self.id, index))
    }

    /// Bonds incident to `atom`, in storage order. Empty if `atom` does not
    /// resolve.
    pub fn bonds(&self, atom: Atom) -> Vec<Bond> {
        match self.atom_slot(atom) {
            Some(index) => self
                .store
                .incident_bonds(index)
                .iter()
                .map(|&bond| Bond::new(self.id, bond))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Endpoints of `bond` as (atom1, atom2), in the order they were bonded.
    pub fn bond_atoms(&self, bond: Bond) -> Option<(Atom, Atom)> {
        let (a, b) = self.store.bond_pair(self.bond_slot(bond)?)?;
        Some((Atom::new(self.id, a), Atom::new(self.id, b)))
    }

    /// The endpoint of `bond` that is not `atom`; `None` if `atom` is not on
    /// the bond.
    pub fn other_atom(&self, bond: Bond, atom: Atom) -> Option<Atom> {
        let (a1, a2) = self.bond_atoms(bond)?;
        if a1 == atom {
            Some(a2)
        } else if a2 == atom {
            Some(a1)
        } else {
            None
        }
    }

    // ---- Unique ids ----

    pub fn atom_unique_id(&self, atom: Atom) -> Option<UniqueId> {
        self.atom_ids.id_at(self.atom_slot(atom)?)
    }

    pub fn atom_by_unique_id(&self, uid: UniqueId) -> Option<Atom> {
        self.atom_ids
            .resolve(uid)
            .map(|index| Atom::new(self.id, index))
    }

    pub fn bond_unique_id(&self, bond: Bond) -> Option<UniqueId> {
        self.bond_ids.id_at(self.bond_slot(bond)?)
    }

    pub fn bond_by_unique_id(&self, uid: UniqueId) -> Option<Bond> {
        self.bond_ids
            .resolve(uid)
            .map(|index| Bond::new(self.id, index))
    }

    // ---- Attributes ----

    pub fn atom_data(&self, atom: Atom) -> Option<&AtomData> {
        self.store.atom(self.atom_slot(atom)?)
    }

    /// Mutable attributes of `atom`. Counts as an atom modification.
    pub fn atom_data_mut(&mut self, atom: Atom) -> Option<&mut AtomData> {
        let index = self.atom_slot(atom)?;
        self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::MODIFIED;
        self.store.atom_mut(index)
    }

    pub fn bond_data(&self, bond: Bond) -> Option<&BondData> {
        self.store.bond(self.bond_slot(bond)?)
    }

    /// Mutable attributes of `bond`. Counts as a bond modification.
    pub fn bond_data_mut(&mut self, bond: Bond) -> Option<&mut BondData> {
        let index = self.bond_slot(bond)?;
        self.pending |= MoleculeChanges::BONDS | MoleculeChanges::MODIFIED;
        self.store.bond_mut(index)
    }

    fn edit_atom(
        &mut self,
        atom: Atom,
        edit: impl FnOnce(&mut AtomData),
    ) -> Result<(), GraphError> {
        let index = self.require_atom(atom)?;
        if let Some(data) = self.store.atom_mut(index) {
            edit(data);
        }
        self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::MODIFIED;
        Ok(())
    }

    pub fn atomic_number(&self, atom: Atom) -> Option<u8> {
        self.atom_data(atom).map(|a| a.atomic_num())
    }

    pub fn set_atomic_number(&mut self, atom: Atom, atomic_num: u8) -> Result<(), GraphError> {
        self.edit_atom(atom, |a| a.atomic_num = atomic_num)
    }

    pub fn position_3d(&self, atom: Atom) -> Option<[f64; 3]> {
        self.atom_data(atom).map(|a| a.position_3d())
    }

    pub fn set_position_3d(&mut self, atom: Atom, position: [f64; 3]) -> Result<(), GraphError> {
        self.edit_atom(atom, |a| a.set_position_3d(position))
    }

    pub fn position_2d(&self, atom: Atom) -> Option<[f64; 2]> {
        self.atom_data(atom).and_then(|a| a.position_2d)
    }

    pub fn set_position_2d(
        &mut self,
        atom: Atom,
        position: Option<[f64; 2]>,
    ) -> Result<(), GraphError> {
        self.edit_atom(atom, |a| a.position_2d = position)
    }

    pub fn formal_charge(&self, atom: Atom) -> Option<i8> {
        self.atom_data(atom).map(|a| a.formal_charge)
    }

    pub fn set_formal_charge(&mut self, atom: Atom, charge: i8) -> Result<(), GraphError> {
        self.edit_atom(atom, |a| a.formal_charge = charge)
    }

    pub fn is_selected(&self, atom: Atom) -> Option<bool> {
        self.atom_data(atom).map(|a| a.is_selected())
    }

    pub fn set_selected(&mut self, atom: Atom, selected: bool) -> Result<(), GraphError> {
        self.edit_atom(atom, |a| a.set_selected(selected))
    }

    pub fn bond_order(&self, bond: Bond) -> Option<u8> {
        self.bond_data(bond).map(|b| b.order)
    }

    pub fn set_bond_order(&mut self, bond: Bond, order: u8) -> Result<(), GraphError> {
        let index = self.require_bond(bond)?;
        if let Some(data) = self.store.bond_mut(index) {
            data.order = order;
        }
        self.pending |= MoleculeChanges::BONDS | MoleculeChanges::MODIFIED;
        Ok(())
    }

    // ---- Selection ----

    pub fn is_selection_empty(&self) -> bool {
        !self.store.atoms().iter().any(|a| a.selected)
    }

    pub fn selected_atoms(&self) -> Vec<Atom> {
        self.atoms()
            .filter(|&atom| self.is_selected(atom) == Some(true))
            .collect()
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for index in 0..self.store.atom_count() {
            if let Some(atom) = self.store.atom_mut(index) {
                atom.selected = selected;
            }
        }
        if !self.is_empty() {
            self.pending |= MoleculeChanges::ATOMS | MoleculeChanges::MODIFIED;
        }
    }

    // ---- Geometry ----

    /// Mean 3D position of all atoms; the origin for an empty molecule.
    pub fn center_of_geometry(&self) -> [f64; 3] {
        let atoms = self.store.atoms();
        if atoms.is_empty() {
            return [0.0; 3];
        }
        let sum = atoms.iter().fold([0.0; 3], |acc, a| add(acc, a.position_3d));
        scale(sum, 1.0 / atoms.len() as f64)
    }

    /// Position weighted by standard atomic weight.
    ///
    /// Dummy atoms (atomic number 0) and unknown elements weigh nothing. The
    /// origin is returned when the total mass is zero.
    pub fn center_of_mass(&self) -> [f64; 3] {
        let (weighted, total) =
            self.store
                .atoms()
                .iter()
                .fold(([0.0; 3], 0.0), |(acc, total), a| {
                    let mass = element::atomic_weight(a.atomic_num).unwrap_or(0.0);
                    (add(acc, scale(a.position_3d, mass)), total + mass)
                });
        if total > 0.0 {
            scale(weighted, 1.0 / total)
        } else {
            [0.0; 3]
        }
    }

    // ---- Meshes ----

    /// Append an empty mesh and return it for filling in.
    pub fn add_mesh(&mut self) -> &mut Mesh {
        self.meshes.push(Mesh::new());
        let last = self.meshes.len() - 1;
        &mut self.meshes[last]
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn remove_mesh(&mut self, index: usize) -> Option<Mesh> {
        (index < self.meshes.len()).then(|| self.meshes.remove(index))
    }

    pub fn clear_meshes(&mut self) {
        self.meshes.clear();
    }

    // ---- Metadata ----

    pub fn data_map(&self) -> &DataMap {
        &self.data
    }

    pub fn data_map_mut(&mut self) -> &mut DataMap {
        &mut self.data
    }

    pub fn set_data_map(&mut self, data: DataMap) {
        self.data = data;
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Variant>) {
        self.data.set_value(key, value);
    }

    pub fn data(&self, key: &str) -> &Variant {
        self.data.value(key)
    }

    // ---- Change notification ----

    /// Changes recorded since the last drain.
    pub fn pending_changes(&self) -> MoleculeChanges {
        self.pending
    }

    /// Return and reset the pending change mask.
    pub fn take_changes(&mut self) -> MoleculeChanges {
        std::mem::take(&mut self.pending)
    }

    /// Drain pending changes into `sink`. The sink is not called when
    /// nothing changed.
    pub fn notify<S: ChangeSink + ?Sized>(&mut self, sink: &mut S) -> MoleculeChanges {
        let changes = self.take_changes();
        if !changes.is_empty() {
            sink.molecule_changed(changes);
        }
        changes
    }

    /// Run `edit` and return the changes it made. Those changes are consumed;
    /// anything pending before the call stays pending.
    pub fn batch(&mut self, edit: impl FnOnce(&mut Self)) -> MoleculeChanges {
        let before = self.take_changes();
        edit(self);
        let produced = self.take_changes();
        self.pending = before;
        produced
    }
}

fn check_restore_id(
    table: &IdentityTable,
    kind: ElementKind,
    uid: UniqueId,
) -> Result<(), GraphError> {
    if !IdentityTable::in_range(uid) {
        warn!(%kind, uid = uid.value(), "rejected restore: unique id out of range");
        return Err(GraphError::UniqueIdOutOfRange { kind, uid });
    }
    if table.is_active(uid) {
        warn!(%kind, uid = uid.value(), "rejected restore: unique id in use");
        return Err(GraphError::UniqueIdInUse { kind, uid });
    }
    Ok(())
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scale(v: [f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

impl Default for Molecule {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with identity reset: see the [module docs](self).
///
/// The copy gets its own [`MoleculeId`], so handles into the source do not
/// resolve in it, and starts with no pending changes.
impl Clone for Molecule {
    fn clone(&self) -> Self {
        debug!(
            atoms = self.atom_count(),
            bonds = self.bond_count(),
            "copying molecule with unique id reset"
        );
        Self {
            id: MoleculeId::next(),
            store: self.store.clone(),
            atom_ids: IdentityTable::sequential(self.store.atom_count()),
            bond_ids: IdentityTable::sequential(self.store.bond_count()),
            meshes: self.meshes.clone(),
            data: self.data.clone(),
            pending: MoleculeChanges::empty(),
        }
    }

    /// Assignment: replaces all content and resets unique ids to `0..n`.
    ///
    /// `self` keeps its [`MoleculeId`]; handles it issued earlier now index
    /// into the new content. Old elements are recorded as removed and new
    /// ones as added, per element space; replacing nothing with nothing
    /// records nothing.
    fn clone_from(&mut self, source: &Self) {
        debug!(
            atoms = source.atom_count(),
            bonds = source.bond_count(),
            "assigning molecule with unique id reset"
        );
        let (old_atoms, old_bonds) = (self.atom_count(), self.bond_count());
        self.store.clone_from(&source.store);
        self.atom_ids = IdentityTable::sequential(self.store.atom_count());
        self.bond_ids = IdentityTable::sequential(self.store.bond_count());
        self.meshes.clone_from(&source.meshes);
        self.data.clone_from(&source.data);
        let atoms = replace_changes(MoleculeChanges::ATOMS, old_atoms, source.atom_count());
        let bonds = replace_changes(MoleculeChanges::BONDS, old_bonds, source.bond_count());
        self.pending |= atoms | bonds;
    }
}

fn replace_changes(element: MoleculeChanges, old: usize, new: usize) -> MoleculeChanges {
    let mut changes = MoleculeChanges::empty();
    if old > 0 {
        changes |= element | MoleculeChanges::REMOVED;
    }
    if new > 0 {
        changes |= element | MoleculeChanges::ADDED;
    }
    changes
}

/// Content equality: atoms, bonds, meshes and metadata. Unique ids, the
/// molecule token and pending changes are not compared.
impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store && self.meshes == other.meshes && self.data == other.data
    }
}

impl fmt::Debug for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Molecule")
            .field("id", &self.id)
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("mesh_count", &self.meshes.len())
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> (Molecule, [Atom; 3]) {
        let mut mol = Molecule::new();
        let o = mol.add_atom_at(8, [0.0, 0.0, 0.0]);
        let h1 = mol.add_atom_at(1, [0.6, -0.5, 0.0]);
        let h2 = mol.add_atom_at(1, [-0.6, -0.5, 0.0]);
        mol.add_bond(o, h1, 1).unwrap();
        mol.add_bond(o, h2, 2).unwrap();
        (mol, [o, h1, h2])
    }

    #[test]
    fn handles_from_another_molecule_do_not_resolve() {
        let (mol, [o, ..]) = water();
        let other = Molecule::new();
        assert!(mol.is_valid_atom(o));
        assert!(!other.is_valid_atom(o));
        assert_eq!(other.atomic_number(o), None);
    }

    #[test]
    fn self_bond_is_rejected() {
        let (mut mol, [o, ..]) = water();
        assert_eq!(
            mol.add_bond(o, o, 1),
            Err(GraphError::SelfBond { index: 0 })
        );
        assert_eq!(mol.bond_count(), 2);
    }

    #[test]
    fn parallel_bonds_are_allowed() {
        let (mut mol, [o, h1, _]) = water();
        let extra = mol.add_bond(h1, o, 1).unwrap();
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(mol.bond_between(o, h1).map(Bond::index), Some(0));
        assert_eq!(mol.bonds(h1).len(), 2);
        assert_eq!(extra.index(), 2);
    }

    #[test]
    fn bond_to_stale_atom_is_an_error() {
        let (mut mol, [o, _, h2]) = water();
        mol.remove_atom(o);
        let err = mol.add_bond(h2, Atom::new(mol.id(), 0), 1);
        assert_eq!(
            err,
            Err(GraphError::InvalidHandle {
                kind: ElementKind::Atom,
                index: 2,
            })
        );
    }

    #[test]
    fn restoring_a_live_id_is_rejected() {
        let (mut mol, _) = water();
        let err = mol.add_atom_with_id(6, UniqueId::new(1)).unwrap_err();
        assert_eq!(
            err,
            GraphError::UniqueIdInUse {
                kind: ElementKind::Atom,
                uid: UniqueId::new(1),
            }
        );
        assert_eq!(mol.atom_count(), 3);
    }

    #[test]
    fn restoring_a_far_id_keeps_allocation_ahead() {
        let (mut mol, [o, ..]) = water();
        let far = UniqueId::new(1 << 40);
        let n = mol.add_atom_with_id(7, far).unwrap();
        assert_eq!(mol.atom_by_unique_id(far), Some(n));
        let c = mol.add_atom(6);
        assert_eq!(mol.atom_unique_id(c), Some(UniqueId::new((1 << 40) + 1)));

        let bond = mol.add_bond_with_id(o, n, 1, far).unwrap();
        assert_eq!(mol.bond_by_unique_id(far), Some(bond));
        mol.remove_atom(n);
        assert!(mol.atom_by_unique_id(far).is_none());
        assert!(mol.bond_by_unique_id(far).is_none());
    }

    #[test]
    fn restoring_an_out_of_range_id_is_rejected() {
        let (mut mol, [o, h1, _]) = water();
        let top = UniqueId::new(usize::MAX);
        assert_eq!(
            mol.add_atom_with_id(8, top),
            Err(GraphError::UniqueIdOutOfRange {
                kind: ElementKind::Atom,
                uid: top,
            })
        );
        assert!(matches!(
            mol.add_bond_with_id(o, h1, 1, top),
            Err(GraphError::UniqueIdOutOfRange { kind: ElementKind::Bond, .. })
        ));
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);

        let edge = UniqueId::new(IdentityTable::MAX_ID);
        assert!(mol.add_atom_with_id(8, edge).is_ok());
        let next = mol.add_atom(1);
        assert_eq!(
            mol.atom_unique_id(next),
            Some(UniqueId::new(IdentityTable::MAX_ID + 1))
        );
    }

    #[test]
    fn restoring_a_live_bond_id_is_rejected() {
        let (mut mol, [o, h1, _]) = water();
        assert!(matches!(
            mol.add_bond_with_id(o, h1, 1, UniqueId::new(0)),
            Err(GraphError::UniqueIdInUse { .. })
        ));
    }

    #[test]
    fn remove_atom_shifts_later_atoms() {
        let (mut mol, [o, h1, h2]) = water();
        let removed = mol.remove_atom(h1).unwrap();
        assert_eq!(removed.atomic_num, 1);
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 1);
        let moved = mol.atom_by_unique_id(UniqueId::new(2)).unwrap();
        assert_eq!(moved.index(), 1);
        assert_eq!(mol.position_3d(moved), Some([-0.6, -0.5, 0.0]));
        let (a, b) = mol.bond_atoms(mol.bond(0).unwrap()).unwrap();
        assert_eq!((a, b), (o, moved));
        assert_eq!(mol.bond_order(mol.bond(0).unwrap()), Some(2));
        // The old handle to h2 is now out of range.
        assert!(!mol.is_valid_atom(h2));
        assert_eq!(mol.remove_atom(h2), None);
    }

    #[test]
    fn other_atom() {
        let (mol, [o, h1, h2]) = water();
        let bond = mol.bond(0).unwrap();
        assert_eq!(mol.other_atom(bond, o), Some(h1));
        assert_eq!(mol.other_atom(bond, h1), Some(o));
        assert_eq!(mol.other_atom(bond, h2), None);
    }

    #[test]
    fn setters_report_invalid_handles() {
        let (mut mol, [o, ..]) = water();
        mol.set_formal_charge(o, -1).unwrap();
        mol.set_position_2d(o, Some([1.0, 2.0])).unwrap();
        assert_eq!(mol.formal_charge(o), Some(-1));
        assert_eq!(mol.position_2d(o), Some([1.0, 2.0]));

        let stale = Atom::new(mol.id(), 10);
        assert!(matches!(
            mol.set_atomic_number(stale, 6),
            Err(GraphError::InvalidHandle { .. })
        ));
        let stale = Bond::new(mol.id(), 10);
        assert!(mol.set_bond_order(stale, 2).is_err());
    }

    #[test]
    fn selection() {
        let (mut mol, [o, h1, _]) = water();
        assert!(mol.is_selection_empty());
        mol.set_selected(h1, true).unwrap();
        assert!(!mol.is_selection_empty());
        assert_eq!(mol.selected_atoms(), vec![h1]);
        mol.set_all_selected(true);
        assert_eq!(mol.selected_atoms().len(), 3);
        mol.set_all_selected(false);
        assert_eq!(mol.is_selected(o), Some(false));
    }

    #[test]
    fn centers() {
        let (mol, _) = water();
        let c = mol.center_of_geometry();
        assert!(c[0].abs() < 1e-12);
        assert!((c[1] + 1.0 / 3.0).abs() < 1e-12);

        let com = mol.center_of_mass();
        let total = 15.999 + 2.0 * 1.008;
        assert!((com[1] - (-0.5 * 2.0 * 1.008 / total)).abs() < 1e-9);
        assert!(com[0].abs() < 1e-12);

        let empty = Molecule::new();
        assert_eq!(empty.center_of_geometry(), [0.0; 3]);
        assert_eq!(empty.center_of_mass(), [0.0; 3]);
    }

    #[test]
    fn dummy_atoms_carry_no_mass() {
        let mut mol = Molecule::new();
        mol.add_atom_at(0, [5.0, 5.0, 5.0]);
        assert_eq!(mol.center_of_mass(), [0.0; 3]);
        mol.add_atom_at(6, [1.0, 0.0, 0.0]);
        let com = mol.center_of_mass();
        assert!((com[0] - 1.0).abs() < 1e-12);
        assert_eq!(com[1], 0.0);
    }

    #[test]
    fn change_tracking() {
        let (mut mol, [o, ..]) = water();
        assert_eq!(
            mol.take_changes(),
            MoleculeChanges::ATOMS | MoleculeChanges::BONDS | MoleculeChanges::ADDED
        );
        assert!(mol.pending_changes().is_empty());

        mol.set_position_3d(o, [1.0, 1.0, 1.0]).unwrap();
        let mut seen = Vec::new();
        let mut sink = |c: MoleculeChanges| seen.push(c);
        mol.notify(&mut sink);
        mol.notify(&mut sink);
        assert_eq!(
            seen,
            vec![MoleculeChanges::ATOMS | MoleculeChanges::MODIFIED]
        );
    }

    #[test]
    fn batch_returns_only_its_own_changes() {
        let (mut mol, [o, ..]) = water();
        let changes = mol.batch(|m| {
            m.remove_atom(o);
        });
        assert_eq!(
            changes,
            MoleculeChanges::ATOMS | MoleculeChanges::BONDS | MoleculeChanges::REMOVED
        );
        assert!(mol.pending_changes().contains(MoleculeChanges::ADDED));
        assert!(!mol.pending_changes().contains(MoleculeChanges::REMOVED));
    }

    #[test]
    fn meshes_survive_structural_edits() {
        let (mut mol, [o, ..]) = water();
        mol.add_mesh().set_name("surface");
        mol.remove_atom(o);
        assert_eq!(mol.mesh_count(), 1);
        assert_eq!(mol.mesh(0).map(Mesh::name), Some("surface"));
        assert!(mol.remove_mesh(3).is_none());
        assert!(mol.remove_mesh(0).is_some());
        assert_eq!(mol.mesh_count(), 0);
    }

    #[test]
    fn clear_atoms_restarts_both_id_spaces() {
        let (mut mol, _) = water();
        mol.clear_atoms();
        assert!(mol.is_empty());
        assert_eq!(mol.bond_count(), 0);
        let a = mol.add_atom(6);
        let b = mol.add_atom(6);
        let bond = mol.add_bond(a, b, 1).unwrap();
        assert_eq!(mol.atom_unique_id(a), Some(UniqueId::new(0)));
        assert_eq!(mol.bond_unique_id(bond), Some(UniqueId::new(0)));
    }

    #[test]
    fn clone_from_records_only_what_was_replaced() {
        let mut target = Molecule::new();
        target.clone_from(&Molecule::new());
        assert!(target.pending_changes().is_empty());

        let mut atoms_only = Molecule::new();
        atoms_only.add_atom(6);
        target.clone_from(&atoms_only);
        assert_eq!(
            target.take_changes(),
            MoleculeChanges::ATOMS | MoleculeChanges::ADDED
        );

        let (source, _) = water();
        target.clone_from(&source);
        assert_eq!(
            target.take_changes(),
            MoleculeChanges::ATOMS
                | MoleculeChanges::BONDS
                | MoleculeChanges::ADDED
                | MoleculeChanges::REMOVED
        );

        target.clone_from(&Molecule::new());
        assert_eq!(
            target.take_changes(),
            MoleculeChanges::ATOMS | MoleculeChanges::BONDS | MoleculeChanges::REMOVED
        );
    }

    #[test]
    fn clone_from_keeps_molecule_token() {
        let (source, _) = water();
        let mut target = Molecule::new();
        let token = target.id();
        target.add_atom(6);
        target.clone_from(&source);
        assert_eq!(target.id(), token);
        assert_eq!(target, source);
        assert!(target.pending_changes().contains(MoleculeChanges::REMOVED));
    }
}
