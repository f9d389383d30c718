//! Error types for structural edits.
//!
//! Lookups that can miss (stale handles, freed unique ids, out-of-range
//! positions) return `Option` and never produce a [`GraphError`]. Errors are
//! reserved for edits whose arguments cannot be honoured.

use std::fmt;

use thiserror::Error;

use crate::handle::UniqueId;

/// Which element space an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Atom,
    Bond,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom => write!(f, "atom"),
            Self::Bond => write!(f, "bond"),
        }
    }
}

/// Errors returned by mutating operations on a [`Molecule`](crate::Molecule).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The handle belongs to another molecule or its index is out of range.
    #[error("{kind} handle at index {index} does not resolve in this molecule")]
    InvalidHandle { kind: ElementKind, index: usize },

    /// An explicit unique id was supplied that is currently bound to a live
    /// element.
    #[error("{kind} unique id {uid} is already in use")]
    UniqueIdInUse { kind: ElementKind, uid: UniqueId },

    /// An explicit unique id lies above the range reserved for restores.
    #[error("{kind} unique id {uid} is out of range")]
    UniqueIdOutOfRange { kind: ElementKind, uid: UniqueId },

    /// Both endpoints of a requested bond are the same atom.
    #[error("cannot bond atom {index} to itself")]
    SelfBond { index: usize },
}
