//! Error types for gradvec-core.

use thiserror::Error;

use crate::size::SizeInvariant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("non-negative value expected, got {0}")]
    NonNegativeExpected(i64),

    #[error("strictly positive value expected, got {0}")]
    StrictlyPositiveExpected(i64),

    #[error("matching sizes expected: expected {expected}, got {actual}")]
    MatchingSizesExpected {
        expected: SizeInvariant,
        actual: SizeInvariant,
    },

    #[error("division by zero")]
    DivisionByZero,
}

pub type Result<T> = std::result::Result<T, Error>;
