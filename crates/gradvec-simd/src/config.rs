//! Kernel selection configuration.
//!
//! Provides a unified configuration for selecting:
//! - Instruction set (AVX-512, AVX2+FMA, portable lanes)
//! - Summation strategy (plain FMA or compensated)

use crate::capability::SimdCapability;
use crate::dot::{dot, dot_kahan};
use crate::norm::{l2_norm, squared_l2_norm};
use crate::slice::VectorSlice;

/// Accumulation strategy for dot products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Summation {
    /// Lane-wise fused multiply-add.
    #[default]
    Fast,
    /// Lane-wise compensated (Kahan-style) accumulation.
    Compensated,
}

impl Summation {
    /// Parse from a string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "fast" | "fma" | "plain" => Some(Self::Fast),
            "kahan" | "compensated" | "accurate" => Some(Self::Compensated),
            _ => None,
        }
    }
}

/// Kernel dispatch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Instruction set used by the kernels. Always supported by the CPU.
    capability: SimdCapability,
    /// Accumulation strategy for [`KernelConfig::dot`].
    pub summation: Summation,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            capability: SimdCapability::detect(),
            summation: Summation::Fast,
        }
    }
}

impl KernelConfig {
    /// Request an instruction set.
    ///
    /// If the CPU cannot execute it, the detected capability is used instead.
    pub fn with_capability(mut self, capability: SimdCapability) -> Self {
        if capability.is_supported() {
            self.capability = capability;
        } else {
            let detected = SimdCapability::detect();
            log::warn!(
                "{} not supported on this CPU, using {} instead",
                capability,
                detected
            );
            self.capability = detected;
        }
        self
    }

    pub fn with_summation(mut self, summation: Summation) -> Self {
        self.summation = summation;
        self
    }

    /// Compensated summation with the detected capability.
    pub fn compensated() -> Self {
        Self::default().with_summation(Summation::Compensated)
    }

    pub fn capability(&self) -> SimdCapability {
        self.capability
    }

    /// Dot product using the configured capability and summation.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` have different lengths.
    #[inline]
    pub fn dot(&self, a: VectorSlice<'_>, b: VectorSlice<'_>) -> f64 {
        match self.summation {
            Summation::Fast => dot(a, b, self.capability),
            Summation::Compensated => dot_kahan(a, b, self.capability),
        }
    }

    #[inline]
    pub fn squared_l2_norm(&self, a: VectorSlice<'_>) -> f64 {
        squared_l2_norm(a, self.capability)
    }

    #[inline]
    pub fn l2_norm(&self, a: VectorSlice<'_>) -> f64 {
        l2_norm(a, self.capability)
    }
}
