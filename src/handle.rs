//! Value handles for atoms and bonds.
//!
//! An [`Atom`] or [`Bond`] is a position in a molecule's storage plus the
//! [`MoleculeId`] of the molecule that produced it. Handles own nothing and
//! are never invalidated eagerly: whether one still resolves is decided by
//! the molecule at the moment it is used (see
//! [`Molecule::is_valid_atom`](crate::Molecule::is_valid_atom)). A handle
//! taken before a structural edit may point at a different element after
//! it; resolve through a [`UniqueId`] to keep a reference across edits.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static MOLECULE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity token of one molecule instance.
///
/// Drawn from a process-wide counter, so a handle from one molecule never
/// resolves in another, including in a copy of the same molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoleculeId(u64);

impl MoleculeId {
    pub(crate) fn next() -> Self {
        Self(MOLECULE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable identifier of an atom or bond, independent of its storage index.
///
/// Atoms and bonds draw from separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniqueId(usize);

impl UniqueId {
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for UniqueId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Handle to the atom stored at `index` of molecule `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom {
    owner: MoleculeId,
    index: usize,
}

impl Atom {
    pub(crate) fn new(owner: MoleculeId, index: usize) -> Self {
        Self { owner, index }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn owner(self) -> MoleculeId {
        self.owner
    }
}

/// Handle to the bond stored at `index` of molecule `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    owner: MoleculeId,
    index: usize,
}

impl Bond {
    pub(crate) fn new(owner: MoleculeId, index: usize) -> Self {
        Self { owner, index }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn owner(self) -> MoleculeId {
        self.owner
    }
}
