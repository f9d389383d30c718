//! Bidirectional unique-id ⇄ storage-index table.
//!
//! One table exists per element space (atoms, bonds). `id_to_index` holds
//! only live ids, so its size follows the element count rather than the
//! number of ids ever handed out; `index_to_id` mirrors the storage array so
//! compaction can find which id lives at a given position in O(1).

use std::collections::HashMap;

use crate::handle::UniqueId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityTable {
    id_to_index: HashMap<UniqueId, usize>,
    index_to_id: Vec<UniqueId>,
    next: usize,
}

impl IdentityTable {
    /// Highest id value an explicit bind may use. The upper half of the id
    /// space is left to the allocator so it can never run out after a
    /// restore near the top.
    pub const MAX_ID: usize = usize::MAX >> 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose ids are `0..len`, id `i` bound to index `i`.
    pub fn sequential(len: usize) -> Self {
        Self {
            id_to_index: (0..len).map(|i| (UniqueId::new(i), i)).collect(),
            index_to_id: (0..len).map(UniqueId::new).collect(),
            next: len,
        }
    }

    /// Reserve the next id. Ids handed out here are strictly increasing and
    /// never repeat; a freed id only comes back through an explicit [`bind`].
    ///
    /// [`bind`]: IdentityTable::bind
    pub fn allocate(&mut self) -> UniqueId {
        let id = UniqueId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Whether `id` may be bound explicitly. Only [`MAX_ID`] and below are.
    ///
    /// [`MAX_ID`]: IdentityTable::MAX_ID
    pub fn in_range(id: UniqueId) -> bool {
        id.value() <= Self::MAX_ID
    }

    /// Whether `id` currently maps to a live index.
    pub fn is_active(&self, id: UniqueId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    /// Bind `id` to storage `index`.
    ///
    /// `index` is either the next storage slot (`index == len()`) or an
    /// existing slot being relabelled. Binding an id at or past the next
    /// allocation moves the allocator above it.
    pub fn bind(&mut self, id: UniqueId, index: usize) {
        self.next = self.next.max(id.value().saturating_add(1));
        self.id_to_index.insert(id, index);
        if index == self.index_to_id.len() {
            self.index_to_id.push(id);
        } else {
            self.index_to_id[index] = id;
        }
    }

    /// Deactivate `id`, returning the index it was bound to.
    ///
    /// The reverse entry is left for [`remove_index`] to compact.
    ///
    /// [`remove_index`]: IdentityTable::remove_index
    pub fn unbind(&mut self, id: UniqueId) -> Option<usize> {
        self.id_to_index.remove(&id)
    }

    pub fn resolve(&self, id: UniqueId) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    /// The id bound to storage `index`.
    pub fn id_at(&self, index: usize) -> Option<UniqueId> {
        self.index_to_id.get(index).copied()
    }

    /// Move whatever id lives at `old_index` to `new_index`.
    pub fn reindex(&mut self, old_index: usize, new_index: usize) {
        let id = self.index_to_id[old_index];
        self.id_to_index.insert(id, new_index);
        self.index_to_id[new_index] = id;
    }

    /// Drop the entry at `index` and shift every later entry down by one,
    /// mirroring `Vec::remove` on the storage array. Returns the freed id.
    pub fn remove_index(&mut self, index: usize) -> Option<UniqueId> {
        let id = self.id_at(index)?;
        self.unbind(id);
        for old in index + 1..self.index_to_id.len() {
            self.reindex(old, old - 1);
        }
        self.index_to_id.pop();
        Some(id)
    }

    /// Number of live (bound) entries.
    pub fn len(&self) -> usize {
        self.index_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_id.is_empty()
    }

    /// Forget every id and restart allocation at zero.
    pub fn clear(&mut self) {
        self.id_to_index.clear();
        self.index_to_id.clear();
        self.next = 0;
    }
}
