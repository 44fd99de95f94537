//! Non-owning windows into f64 buffers.

use std::hash::{Hash, Hasher};

/// Bit pattern used for content equality and hashing.
///
/// Every NaN maps to the same pattern so that a NaN element compares equal
/// to itself; `0.0` and `-0.0` stay distinct.
#[inline]
pub fn canonical_bits(x: f64) -> u64 {
    if x.is_nan() {
        f64::NAN.to_bits()
    } else {
        x.to_bits()
    }
}

/// A `(buffer, offset, length)` view into a raw f64 buffer.
///
/// Borrowed for the duration of one computation; it carries no ownership.
/// Equality and hashing compare the windowed content, not the buffer
/// identity or the offset.
#[derive(Debug, Clone, Copy)]
pub struct VectorSlice<'a> {
    buffer: &'a [f64],
    offset: usize,
    length: usize,
}

impl<'a> VectorSlice<'a> {
    /// Create a window of `length` elements starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + length` exceeds the buffer length.
    #[inline]
    pub fn new(buffer: &'a [f64], offset: usize, length: usize) -> Self {
        let in_bounds = offset
            .checked_add(length)
            .is_some_and(|end| end <= buffer.len());
        assert!(
            in_bounds,
            "slice window {}..{}+{} out of bounds for buffer of length {}",
            offset,
            offset,
            length,
            buffer.len()
        );
        Self {
            buffer,
            offset,
            length,
        }
    }

    /// A window covering the whole buffer.
    #[inline]
    pub fn full(buffer: &'a [f64]) -> Self {
        Self {
            buffer,
            offset: 0,
            length: buffer.len(),
        }
    }

    /// The underlying buffer, including elements outside the window.
    #[inline]
    pub fn buffer(&self) -> &'a [f64] {
        self.buffer
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The windowed elements.
    #[inline]
    pub fn as_slice(&self) -> &'a [f64] {
        &self.buffer[self.offset..self.offset + self.length]
    }

    /// A sub-window relative to this one.
    ///
    /// # Panics
    ///
    /// Panics if the sub-window does not fit inside this window.
    pub fn window(&self, offset: usize, length: usize) -> Self {
        let inner = VectorSlice::new(self.as_slice(), offset, length);
        Self {
            buffer: self.buffer,
            offset: self.offset + inner.offset,
            length: inner.length,
        }
    }

    /// Split into `[0, mid)` and `[mid, len)`.
    ///
    /// # Panics
    ///
    /// Panics if `mid > len`.
    pub fn split_at(&self, mid: usize) -> (Self, Self) {
        assert!(mid <= self.length, "split point {} past length {}", mid, self.length);
        (self.window(0, mid), self.window(mid, self.length - mid))
    }
}

impl<'a> From<&'a [f64]> for VectorSlice<'a> {
    fn from(buffer: &'a [f64]) -> Self {
        Self::full(buffer)
    }
}

impl<'a> From<&'a Vec<f64>> for VectorSlice<'a> {
    fn from(buffer: &'a Vec<f64>) -> Self {
        Self::full(buffer)
    }
}

impl PartialEq for VectorSlice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self
                .as_slice()
                .iter()
                .zip(other.as_slice())
                .all(|(a, b)| canonical_bits(*a) == canonical_bits(*b))
    }
}

impl Eq for VectorSlice<'_> {}

impl Hash for VectorSlice<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for &x in self.as_slice() {
            canonical_bits(x).hash(state);
        }
    }
}
