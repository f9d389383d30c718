//! Connectivity queries over a [`Molecule`].

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use crate::handle::{Atom, Bond};
use crate::molecule::Molecule;

impl Molecule {
    /// Atoms sharing a bond with `atom`, in bond storage order. An atom
    /// joined by parallel bonds appears once per bond.
    pub fn neighbors(&self, atom: Atom) -> Vec<Atom> {
        self.bonds(atom)
            .into_iter()
            .filter_map(|bond| self.other_atom(bond, atom))
            .collect()
    }

    /// Snapshot of the connectivity as a petgraph graph. Node `i` carries
    /// the handle of atom `i` and edge `j` the handle of bond `j`, so the
    /// result can be fed to petgraph algorithms and mapped back.
    pub fn to_graph(&self) -> UnGraph<Atom, Bond> {
        let mut graph = UnGraph::with_capacity(self.atom_count(), self.bond_count());
        for atom in self.atoms() {
            graph.add_node(atom);
        }
        for (bond, &(a, b)) in self.all_bonds().zip(self.store().bond_pairs()) {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), bond);
        }
        graph
    }

    /// Groups of atoms connected through bonds.
    ///
    /// Each group lists its atoms in ascending index order; groups are ordered
    /// by their lowest atom index.
    pub fn connected_components(&self) -> Vec<Vec<Atom>> {
        let mut sets = UnionFind::<usize>::new(self.atom_count());
        for &(a, b) in self.store().bond_pairs() {
            sets.union(a, b);
        }
        let mut group_of_root = vec![usize::MAX; self.atom_count()];
        let mut components: Vec<Vec<Atom>> = Vec::new();
        for atom in self.atoms() {
            let root = sets.find(atom.index());
            if group_of_root[root] == usize::MAX {
                group_of_root[root] = components.len();
                components.push(Vec::new());
            }
            components[group_of_root[root]].push(atom);
        }
        components
    }

    pub fn component_count(&self) -> usize {
        self.connected_components().len()
    }
}
