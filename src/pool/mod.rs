//! Reusable object pools
//!
//! Frame-driven systems recycle their short-lived objects instead of
//! allocating fresh ones every frame:
//! - `ObjectPool<T>` keeps a free list of reset instances
//! - `SlotArray<T>` keeps active instances at stable indices with hole markers

pub mod slots;

pub use slots::SlotArray;

/// A type that can be returned to an [`ObjectPool`] and handed out again.
pub trait Poolable: Default {
    /// Return every mutable field to its default state.
    fn reset(&mut self);
}

/// Free list of reset instances.
///
/// `obtain` never fails: it grows the pool when no free instance is available.
/// Releasing the same instance twice is impossible by construction since
/// `free` takes ownership.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    /// Largest number of free instances held at once
    peak: usize,
    /// Free instances beyond this are dropped instead of kept
    max: usize,
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// Create an empty pool with room for `capacity` free instances
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            peak: 0,
            max: usize::MAX,
        }
    }

    /// Limit how many free instances the pool retains
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = max;
        self.free.truncate(max);
        self
    }

    /// Take a free instance, or construct a new one if none is left
    pub fn obtain(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Reset `item` and keep it for a later `obtain`
    pub fn free(&mut self, mut item: T) {
        item.reset();
        if self.free.len() < self.max {
            self.free.push(item);
            self.peak = self.peak.max(self.free.len());
        }
    }

    /// Release every item of an iterator
    pub fn free_all(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.free(item);
        }
    }

    /// Pre-construct instances until `count` are free
    pub fn fill(&mut self, count: usize) {
        let target = count.min(self.max);
        while self.free.len() < target {
            self.free.push(T::default());
        }
        self.peak = self.peak.max(self.free.len());
        log::debug!("Pool prewarmed with {} free instances", self.free.len());
    }

    /// Drop every free instance
    pub fn clear(&mut self) {
        self.free.clear();
    }

    /// Number of instances waiting to be obtained
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Largest free-list size seen so far
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        value: u32,
        label: Option<&'static str>,
    }

    impl Poolable for Counter {
        fn reset(&mut self) {
            self.value = 0;
            self.label = None;
        }
    }

    #[test]
    fn test_obtain_from_empty_pool_constructs() {
        let mut pool: ObjectPool<Counter> = ObjectPool::new();
        assert_eq!(pool.free_count(), 0);
        let c = pool.obtain();
        assert_eq!(c, Counter::default());
    }

    #[test]
    fn test_free_resets_and_recycles() {
        let mut pool: ObjectPool<Counter> = ObjectPool::new();
        let mut c = pool.obtain();
        c.value = 42;
        c.label = Some("used");
        pool.free(c);
        assert_eq!(pool.free_count(), 1);

        let again = pool.obtain();
        assert_eq!(again.value, 0);
        assert!(again.label.is_none());
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_fill_and_peak() {
        let mut pool: ObjectPool<Counter> = ObjectPool::with_capacity(4);
        pool.fill(4);
        assert_eq!(pool.free_count(), 4);
        let a = pool.obtain();
        let b = pool.obtain();
        assert_eq!(pool.free_count(), 2);
        pool.free_all([a, b]);
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.peak(), 4);
    }

    #[test]
    fn test_max_drops_extra_instances() {
        let mut pool: ObjectPool<Counter> = ObjectPool::new().with_max(1);
        pool.free(Counter::default());
        pool.free(Counter::default());
        assert_eq!(pool.free_count(), 1);
        pool.fill(5);
        assert_eq!(pool.free_count(), 1);
    }
}
