//! Dirty chunk tracking between a brush edit and the mesh rebuild.

use std::collections::{BTreeSet, HashMap};

/// Tracks which mesh chunks need a rebuild after an edit.
///
/// Cells report the chunks they belong to while a brush is applied; the
/// set is drained once at the end of the edit so each chunk is rebuilt at
/// most once per call.
#[derive(Debug, Default)]
pub struct ChunkInvalidator {
    /// Chunks waiting for a rebuild, ordered by id
    dirty_chunks: BTreeSet<u32>,
    /// Generation counters, bumped each time a chunk is marked dirty
    generations: HashMap<u32, u32>,
}

impl ChunkInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a chunk dirty and bump its generation.
    ///
    /// Marking an already dirty chunk again within the same edit is a no-op.
    pub fn mark_chunk_dirty(&mut self, chunk: u32) {
        if self.dirty_chunks.insert(chunk) {
            let generation = self.generations.entry(chunk).or_insert(0);
            *generation = generation.wrapping_add(1);
        }
    }

    /// Mark every chunk a cell belongs to.
    pub fn mark_cell_dirty(&mut self, memberships: &[u32]) {
        for &chunk in memberships {
            self.mark_chunk_dirty(chunk);
        }
    }

    /// Take all dirty chunks in ascending order and clear the dirty set.
    pub fn take_dirty_chunks(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.dirty_chunks).into_iter().collect()
    }

    /// Number of times `chunk` has been invalidated.
    pub fn generation(&self, chunk: u32) -> u32 {
        self.generations.get(&chunk).copied().unwrap_or(0)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty_chunks.is_empty()
    }

    pub fn is_chunk_dirty(&self, chunk: u32) -> bool {
        self.dirty_chunks.contains(&chunk)
    }

    pub fn dirty_chunk_count(&self) -> usize {
        self.dirty_chunks.len()
    }

    /// Clear dirty state and generations, used when the mesh is rebuilt.
    pub fn clear(&mut self) {
        self.dirty_chunks.clear();
        self.generations.clear();
    }
}
