//! Change bookkeeping for observers of a molecule.
//!
//! Every mutating call on a [`Molecule`](crate::Molecule) ORs its effect
//! into a pending [`MoleculeChanges`] mask. Observers (renderers, undo
//! stacks) collect the mask after a batch of edits with
//! [`Molecule::take_changes`](crate::Molecule::take_changes) or
//! [`Molecule::notify`](crate::Molecule::notify).

use bitflags::bitflags;

bitflags! {
    /// What kind of element changed, and how.
    ///
    /// The element bits (`ATOMS`, `BONDS`) and the operation bits (`ADDED`,
    /// `REMOVED`, `MODIFIED`) are combined, so `ATOMS | BONDS | ADDED` reads
    /// as "atoms and bonds were added".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MoleculeChanges: u32 {
        const ATOMS = 0x01;
        const BONDS = 0x02;
        const ADDED = 0x0400;
        const REMOVED = 0x0800;
        const MODIFIED = 0x1000;
    }
}

impl MoleculeChanges {
    /// No element or operation bits.
    pub const NO_CHANGE: Self = Self::empty();

    pub fn touches_atoms(self) -> bool {
        self.contains(Self::ATOMS)
    }

    pub fn touches_bonds(self) -> bool {
        self.contains(Self::BONDS)
    }

    /// True when elements were added or removed, as opposed to only having
    /// attributes modified.
    pub fn is_structural(self) -> bool {
        self.intersects(Self::ADDED | Self::REMOVED)
    }
}

/// Receiver for drained change masks.
pub trait ChangeSink {
    fn molecule_changed(&mut self, changes: MoleculeChanges);
}

impl<F: FnMut(MoleculeChanges)> ChangeSink for F {
    fn molecule_changed(&mut self, changes: MoleculeChanges) {
        self(changes)
    }
}
