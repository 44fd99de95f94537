//! Validated non-negative sizes.

use std::fmt;
use std::ops::Add;

use crate::error::{Error, Result};

/// A size that is never negative.
///
/// Stored as `usize`, so the invariant is carried by the type; the signed
/// factories below are the validation boundary for values coming from
/// arithmetic that may have gone negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SizeInvariant(usize);

impl SizeInvariant {
    pub const ZERO: SizeInvariant = SizeInvariant(0);

    /// Infallible constructor from an unsigned value.
    #[inline]
    pub const fn new(n: usize) -> Self {
        Self(n)
    }

    /// Validate `n >= 0`.
    pub fn from_non_negative(n: i64) -> Result<Self> {
        usize::try_from(n)
            .map(Self)
            .map_err(|_| Error::NonNegativeExpected(n))
    }

    /// Validate `n > 0`.
    pub fn strictly_positive(n: i64) -> Result<Self> {
        match Self::from_non_negative(n) {
            Ok(size) if !size.is_zero() => Ok(size),
            _ => Err(Error::StrictlyPositiveExpected(n)),
        }
    }

    /// `Some` if `n >= 0`.
    pub fn of(n: i64) -> Option<Self> {
        Self::from_non_negative(n).ok()
    }

    /// Like [`SizeInvariant::from_non_negative`], panicking on a negative value.
    ///
    /// # Panics
    ///
    /// Panics with the `NonNegativeExpected` message if `n < 0`.
    pub fn of_or_panic(n: i64) -> Self {
        match Self::from_non_negative(n) {
            Ok(size) => size,
            Err(e) => panic!("{}", e),
        }
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Sum of the underlying values.
    ///
    /// Not overflow checked: the sum wraps, which keeps it non-negative.
    #[inline]
    pub const fn plus(self, other: SizeInvariant) -> Self {
        Self(self.0.wrapping_add(other.0))
    }
}

impl Add for SizeInvariant {
    type Output = SizeInvariant;

    fn add(self, rhs: SizeInvariant) -> SizeInvariant {
        self.plus(rhs)
    }
}

impl TryFrom<i64> for SizeInvariant {
    type Error = Error;

    fn try_from(n: i64) -> Result<Self> {
        Self::from_non_negative(n)
    }
}

impl From<usize> for SizeInvariant {
    fn from(n: usize) -> Self {
        Self(n)
    }
}

impl From<SizeInvariant> for usize {
    fn from(size: SizeInvariant) -> usize {
        size.0
    }
}

impl fmt::Display for SizeInvariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
