//! SIMD capability detection.
//!
//! Runtime detection of the best available SIMD instruction set, plus the
//! lane width each level processes per step.

use std::sync::OnceLock;

/// Detected SIMD capability level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdCapability {
    /// AVX-512 with 512-bit vectors (8 f64 per vector)
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Avx512,
    /// AVX2 with 256-bit vectors (4 f64 per vector) and FMA
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Avx2,
    /// Portable fallback: fixed 4-wide unrolled scalar lanes
    Scalar,
}

static DETECTED: OnceLock<SimdCapability> = OnceLock::new();

impl SimdCapability {
    /// Detect the best available SIMD capability at runtime.
    ///
    /// The result is computed once per process and cached.
    #[inline]
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| {
            let cap = Self::probe();
            log::debug!("SIMD capability selected: {}", cap);
            cap
        })
    }

    fn probe() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("avx512f") {
                return SimdCapability::Avx512;
            }
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return SimdCapability::Avx2;
            }
        }
        SimdCapability::Scalar
    }

    /// Whether the running CPU can execute kernels at this level.
    pub fn is_supported(&self) -> bool {
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            SimdCapability::Avx512 => is_x86_feature_detected!("avx512f"),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            SimdCapability::Avx2 => {
                is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
            }
            SimdCapability::Scalar => true,
        }
    }

    /// Check if this capability uses SIMD acceleration.
    #[inline]
    pub fn is_simd(&self) -> bool {
        !matches!(self, SimdCapability::Scalar)
    }

    /// Number of f64 lanes processed per step.
    #[inline]
    pub fn lanes(&self) -> usize {
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            SimdCapability::Avx512 => 8,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            SimdCapability::Avx2 => 4,
            SimdCapability::Scalar => 4,
        }
    }

    /// Parse from a user-facing name.
    ///
    /// Names of instruction sets that do not exist on the compilation target
    /// yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            "avx512" | "avx-512" | "avx512f" => Some(Self::Avx512),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            "avx2" | "avx2+fma" => Some(Self::Avx2),
            "scalar" | "none" | "portable" => Some(Self::Scalar),
            "auto" | "detect" => Some(Self::detect()),
            _ => None,
        }
    }

    /// Get a human-readable description of the capability.
    pub fn description(&self) -> &'static str {
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            SimdCapability::Avx512 => "AVX-512 (8 f64 lanes)",
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            SimdCapability::Avx2 => "AVX2+FMA (4 f64 lanes)",
            SimdCapability::Scalar => "Scalar (4 unrolled lanes)",
        }
    }
}

impl Default for SimdCapability {
    fn default() -> Self {
        Self::detect()
    }
}

impl std::fmt::Display for SimdCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
