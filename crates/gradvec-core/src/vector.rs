//! Ownership-aware gradient vector.
//!
//! A [`GradientVector`] either owns an exclusive copy of its values or
//! aliases a caller-held [`SharedBuffer`]. The two modes have distinct
//! constructors: [`GradientVector::copy_from`] (and friends) copy, while
//! [`GradientVector::unsafe_adopt`] aliases. Every algebraic operation
//! returns a new, owning vector; dot products and norms run on the SIMD
//! kernels from `gradvec-simd`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Div, Mul, Neg};

use gradvec_simd::{KernelConfig, SimdCapability, VectorSlice};

use crate::buffer::SharedBuffer;
use crate::error::{Error, Result};
use crate::size::SizeInvariant;

#[derive(Debug, Clone)]
enum Storage {
    Owned(Box<[f64]>),
    Adopted(SharedBuffer),
}

/// A dense f64 vector with validated size.
///
/// Sizes are strictly positive for every vector built through the checked
/// constructors. Equality and hashing compare content (bitwise, with all
/// NaNs equal) regardless of whether the storage is owned or adopted.
///
/// Cloning an adopted vector keeps aliasing the same buffer.
#[derive(Clone)]
pub struct GradientVector {
    storage: Storage,
    size: SizeInvariant,
}

impl GradientVector {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Copy `values` into a new vector.
    ///
    /// Later changes to `values` are never observed by the vector.
    pub fn copy_from(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::StrictlyPositiveExpected(0));
        }
        Ok(Self::from_owned(values.into()))
    }

    /// Build from an array literal, e.g. `GradientVector::of([1.0, 2.0])`.
    pub fn of<const N: usize>(values: [f64; N]) -> Result<Self> {
        Self::copy_from(&values)
    }

    /// Alias `buffer` without copying.
    ///
    /// **Dangerous.** The vector observes every later write made through any
    /// handle to `buffer`, so two reads of the same element may disagree, and
    /// results computed from it may mix old and new values if another thread
    /// writes concurrently. No positivity check is made: an empty buffer
    /// yields a zero-size vector that panics on any indexed access.
    pub fn unsafe_adopt(buffer: &SharedBuffer) -> Self {
        let size = SizeInvariant::new(buffer.len());
        log::trace!("adopting shared buffer of {} elements without copy", size);
        Self {
            storage: Storage::Adopted(buffer.clone()),
            size,
        }
    }

    /// A vector of `size` zeros.
    pub fn zeros(size: i64) -> Result<Self> {
        Self::fill(size, 0.0)
    }

    /// A vector of `size` copies of `value`.
    pub fn fill(size: i64, value: f64) -> Result<Self> {
        let size = SizeInvariant::strictly_positive(size)?;
        Ok(Self::from_owned(vec![value; size.get()].into_boxed_slice()))
    }

    fn from_owned(values: Box<[f64]>) -> Self {
        debug_assert!(!values.is_empty());
        Self {
            size: SizeInvariant::new(values.len()),
            storage: Storage::Owned(values),
        }
    }

    /// Run `f` over the current contents.
    #[inline]
    fn with_values<R>(&self, f: impl FnOnce(&[f64]) -> R) -> R {
        match &self.storage {
            Storage::Owned(values) => f(values),
            Storage::Adopted(buffer) => buffer.read(f),
        }
    }

    // ========================================================================
    // Shape and element access
    // ========================================================================

    #[inline]
    pub fn size(&self) -> SizeInvariant {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size.get()
    }

    /// Only an adopted empty buffer produces an empty vector.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_zero()
    }

    /// Whether the storage aliases a caller-held buffer.
    pub fn is_adopted(&self) -> bool {
        matches!(self.storage, Storage::Adopted(_))
    }

    /// Element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> f64 {
        match self.get_or_none(index) {
            Some(value) => value,
            None => panic!(
                "index {} out of range for vector of size {}",
                index, self.size
            ),
        }
    }

    pub fn get_or_none(&self, index: usize) -> Option<f64> {
        self.with_values(|values| values.get(index).copied())
    }

    /// Element at `index`, or `fallback(index)` when out of range.
    pub fn get_or_else(&self, index: usize, fallback: impl FnOnce(usize) -> f64) -> f64 {
        self.get_or_none(index).unwrap_or_else(|| fallback(index))
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// An exclusive copy of the current contents.
    pub fn to_vec(&self) -> Vec<f64> {
        self.with_values(|values| values.to_vec())
    }

    /// A view that reads the backing storage on every access.
    ///
    /// For an adopted vector, writes made to the buffer after the view was
    /// created are visible through it.
    pub fn live_view(&self) -> VectorView<'_> {
        VectorView { vector: self }
    }

    /// Iterate over the current contents (see [`GradientVector::live_view`]).
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.live_view().iter()
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    /// Multiply every element by `scalar`.
    pub fn times(&self, scalar: f64) -> Self {
        self.map(|x| x * scalar)
    }

    /// Divide every element by `scalar`.
    ///
    /// A zero divisor follows IEEE 754: infinities, or NaN for `0 / 0`.
    /// Use [`GradientVector::safe_div`] to reject it instead.
    pub fn div(&self, scalar: f64) -> Self {
        self.map(|x| x / scalar)
    }

    /// Divide every element by `scalar`, rejecting a zero divisor.
    pub fn safe_div(&self, scalar: f64) -> Result<Self> {
        if scalar == 0.0 {
            return Err(Error::DivisionByZero);
        }
        Ok(self.div(scalar))
    }

    pub fn plus(&self, other: &GradientVector) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn minus(&self, other: &GradientVector) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Combine element-wise with `other`.
    ///
    /// Both operands are snapshotted before `combine` runs, so it may write
    /// to an adopted buffer without affecting this result.
    pub fn zip_with(
        &self,
        other: &GradientVector,
        mut combine: impl FnMut(f64, f64) -> f64,
    ) -> Result<Self> {
        self.check_same_size(other)?;
        let mut values = self.to_vec().into_boxed_slice();
        let rhs = other.to_vec();
        for (x, y) in values.iter_mut().zip(&rhs) {
            *x = combine(*x, *y);
        }
        Ok(Self::rebuild(values))
    }

    /// Apply `transform` to every element. Always preserves the size.
    ///
    /// Runs on a snapshot; no lock is held while `transform` executes.
    pub fn map(&self, mut transform: impl FnMut(f64) -> f64) -> Self {
        let mut values = self.to_vec().into_boxed_slice();
        values.iter_mut().for_each(|x| *x = transform(*x));
        Self::rebuild(values)
    }

    /// Dot product using the detected SIMD capability.
    pub fn dot(&self, other: &GradientVector) -> Result<f64> {
        self.check_same_size(other)?;
        Ok(self.zip_slices(other, |a, b| {
            gradvec_simd::dot(a, b, SimdCapability::detect())
        }))
    }

    /// Compensated dot product, robust to cancellation.
    pub fn dot_kahan(&self, other: &GradientVector) -> Result<f64> {
        self.check_same_size(other)?;
        Ok(self.zip_slices(other, |a, b| {
            gradvec_simd::dot_kahan(a, b, SimdCapability::detect())
        }))
    }

    /// Dot product with an explicit kernel configuration.
    pub fn dot_with(&self, other: &GradientVector, config: &KernelConfig) -> Result<f64> {
        self.check_same_size(other)?;
        Ok(self.zip_slices(other, |a, b| config.dot(a, b)))
    }

    /// Scale to unit L2 norm.
    pub fn normalized(&self) -> Result<Self> {
        self.safe_div(self.l2_norm())
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    pub fn squared_l2_norm(&self) -> f64 {
        self.with_values(gradvec_simd::squared_l2_norm_of)
    }

    pub fn l2_norm(&self) -> f64 {
        self.with_values(gradvec_simd::l2_norm_of)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_same_size(&self, other: &GradientVector) -> Result<()> {
        if self.size == other.size {
            Ok(())
        } else {
            Err(Error::MatchingSizesExpected {
                expected: self.size,
                actual: other.size,
            })
        }
    }

    fn zip_slices<R>(
        &self,
        other: &GradientVector,
        f: impl FnOnce(VectorSlice<'_>, VectorSlice<'_>) -> R,
    ) -> R {
        self.with_values(|a| other.with_values(|b| f(VectorSlice::full(a), VectorSlice::full(b))))
    }

    /// Results of algebra always own their storage.
    fn rebuild(values: Box<[f64]>) -> Self {
        Self {
            size: SizeInvariant::new(values.len()),
            storage: Storage::Owned(values),
        }
    }
}

impl TryFrom<Vec<f64>> for GradientVector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::StrictlyPositiveExpected(0));
        }
        Ok(Self::from_owned(values.into_boxed_slice()))
    }
}

impl TryFrom<&[f64]> for GradientVector {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::copy_from(values)
    }
}

impl PartialEq for GradientVector {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.zip_slices(other, |a, b| a == b)
    }
}

impl Eq for GradientVector {}

impl Hash for GradientVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.with_values(|values| VectorSlice::full(values).hash(state));
    }
}

impl fmt::Debug for GradientVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.to_vec();
        f.debug_struct("GradientVector")
            .field("size", &self.size)
            .field("adopted", &self.is_adopted())
            .field("values", &values)
            .finish()
    }
}

impl fmt::Display for GradientVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_values(|values| {
            f.write_str("[")?;
            for (i, x) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}", x)?;
            }
            f.write_str("]")
        })
    }
}

impl Mul<f64> for &GradientVector {
    type Output = GradientVector;

    fn mul(self, scalar: f64) -> GradientVector {
        self.times(scalar)
    }
}

impl Mul<f64> for GradientVector {
    type Output = GradientVector;

    fn mul(self, scalar: f64) -> GradientVector {
        self.times(scalar)
    }
}

impl Div<f64> for &GradientVector {
    type Output = GradientVector;

    fn div(self, scalar: f64) -> GradientVector {
        GradientVector::div(self, scalar)
    }
}

impl Div<f64> for GradientVector {
    type Output = GradientVector;

    fn div(self, scalar: f64) -> GradientVector {
        GradientVector::div(&self, scalar)
    }
}

impl Neg for &GradientVector {
    type Output = GradientVector;

    fn neg(self) -> GradientVector {
        self.map(|x| -x)
    }
}

impl Neg for GradientVector {
    type Output = GradientVector;

    fn neg(self) -> GradientVector {
        self.map(|x| -x)
    }
}

/// A live, read-only view over a vector's backing storage.
///
/// Nothing is copied; each access reads the storage as it is at that moment.
#[derive(Debug, Clone, Copy)]
pub struct VectorView<'a> {
    vector: &'a GradientVector,
}

impl<'a> VectorView<'a> {
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.vector.get_or_none(index)
    }

    pub fn iter(self) -> impl Iterator<Item = f64> + 'a {
        let vector = self.vector;
        (0..vector.len()).filter_map(move |i| vector.get_or_none(i))
    }

    pub fn first(&self) -> Option<f64> {
        self.get(0)
    }

    pub fn last(&self) -> Option<f64> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }
}

impl<'a> IntoIterator for VectorView<'a> {
    type Item = f64;
    type IntoIter = Box<dyn Iterator<Item = f64> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
