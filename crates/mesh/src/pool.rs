//! Fixed-capacity storage reused across curl rebuilds.
//! Nothing here grows after construction: overflowing a pool means the
//! capacity bookkeeping is wrong, so it panics instead of reallocating.

use std::ops::Deref;

/// Vec with a hard capacity limit.
#[derive(Clone, Debug)]
pub struct FixedVec<T> {
    name: &'static str,
    items: Vec<T>,
    capacity: usize,
}

impl<T> FixedVec<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, item: T) {
        self.check_room();
        self.items.push(item);
    }

    pub fn insert(&mut self, index: usize, item: T) {
        self.check_room();
        self.items.insert(index, item);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn check_room(&self) {
        assert!(
            self.items.len() < self.capacity,
            "{} pool exhausted (capacity {})",
            self.name,
            self.capacity
        );
    }
}

impl<T> Deref for FixedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

/// Pre-sized float buffer filled through a write cursor.
#[derive(Clone, Debug)]
pub struct FloatBuffer {
    name: &'static str,
    data: Vec<f32>,
    cursor: usize,
}

impl FloatBuffer {
    pub fn new(name: &'static str, len: usize) -> Self {
        Self {
            name,
            data: vec![0.0; len],
            cursor: 0,
        }
    }

    #[inline]
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn put(&mut self, value: f32) {
        assert!(
            self.cursor < self.data.len(),
            "{} buffer overflow (capacity {} floats)",
            self.name,
            self.data.len()
        );
        self.data[self.cursor] = value;
        self.cursor += 1;
    }

    pub fn put_all(&mut self, values: &[f32]) {
        for &v in values {
            self.put(v);
        }
    }

    /// First `len` floats, regardless of the cursor.
    #[inline]
    pub fn head(&self, len: usize) -> &[f32] {
        &self.data[..len.min(self.data.len())]
    }
}
