//! Caller-held shared storage for adopted vectors.

use std::sync::Arc;

use parking_lot::RwLock;

/// A fixed-length f64 buffer shared between its holder and any vector that
/// adopts it.
///
/// Cloning the handle shares the storage. Writes through any handle are
/// visible to every [`GradientVector`](crate::GradientVector) built with
/// [`unsafe_adopt`](crate::GradientVector::unsafe_adopt) from it. The length
/// is fixed at construction.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    inner: Arc<RwLock<Box<[f64]>>>,
}

impl SharedBuffer {
    pub fn new(values: impl Into<Box<[f64]>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(values.into())),
        }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }

    pub fn len(&self) -> usize {
        self.inner.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.inner.read_recursive().get(index).copied()
    }

    /// Overwrite one element.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set(&self, index: usize, value: f64) {
        self.inner.write()[index] = value;
    }

    /// Run `f` with shared access to the contents.
    ///
    /// Reentrant: nested reads of the same buffer do not block each other.
    pub fn read<R>(&self, f: impl FnOnce(&[f64]) -> R) -> R {
        f(&self.inner.read_recursive())
    }

    /// Run `f` with exclusive access to the contents.
    pub fn write<R>(&self, f: impl FnOnce(&mut [f64]) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.read(|values| values.to_vec())
    }

    /// Whether both handles share the same storage.
    pub fn ptr_eq(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Vec<f64>> for SharedBuffer {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}
