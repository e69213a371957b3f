//! Slot array with hole markers
//!
//! Removing an entry clears its slot instead of shifting the tail, so indices
//! stay valid while a frame iterates. Inserts fill the lowest hole first and
//! only grow the array when no hole is left.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct SlotArray<T> {
    slots: Vec<Option<T>>,
    /// Min-heap of cleared indices
    holes: BinaryHeap<Reverse<usize>>,
    len: usize,
}

impl<T> Default for SlotArray<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> SlotArray<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            holes: BinaryHeap::new(),
            len: 0,
        }
    }

    /// Place `value` in the first empty slot, or append. Returns its index.
    pub fn insert(&mut self, value: T) -> usize {
        self.len += 1;
        if let Some(Reverse(index)) = self.holes.pop() {
            self.slots[index] = Some(value);
            return index;
        }
        self.slots.push(Some(value));
        self.slots.len() - 1
    }

    /// Clear the slot at `index`, leaving a hole
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let taken = self.slots.get_mut(index)?.take()?;
        self.holes.push(Reverse(index));
        self.len -= 1;
        Some(taken)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Number of slots including holes
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Occupied entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Take every occupied entry, leaving the array empty
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.holes.clear();
        self.len = 0;
        self.slots.drain(..).flatten()
    }
}
