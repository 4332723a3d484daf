//! Feature Flag Catalog
//! One bit per instruction-set extension. ARM and x86 entries never share a bit,
//! so `ARM_AES` and `X86_AES` can't be confused when inspecting a result.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

/// Processor architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Arm,
    X86,
}

impl Architecture {
    /// The marker bit identifying this family in a `FeatureSet`.
    pub fn marker(self) -> FeatureSet {
        match self {
            Architecture::Arm => FeatureSet::ARM,
            Architecture::X86 => FeatureSet::X86,
        }
    }

    /// Extension bits that may legally appear under this family.
    pub fn extensions(self) -> FeatureSet {
        match self {
            Architecture::Arm => FeatureSet::ARM_EXTENSIONS,
            Architecture::X86 => FeatureSet::X86_EXTENSIONS,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::Arm => write!(f, "ARM"),
            Architecture::X86 => write!(f, "x86"),
        }
    }
}

bitflags! {
    /// Instruction-set extensions supported by the running processor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureSet: u32 {
        // Family markers
        const ARM = 1 << 0;
        const X86 = 1 << 1;
        const IS_64_BIT = 1 << 2;

        // ARM
        const ADV_SIMD = 1 << 3;
        const ARM_AES = 1 << 4;
        const CRC32 = 1 << 5;
        const DP = 1 << 6;
        const RDM = 1 << 7;
        const SHA1 = 1 << 8;
        const SHA256 = 1 << 9;

        // x86
        const X86_AES = 1 << 10;
        const AVX = 1 << 11;
        const AVX2 = 1 << 12;
        const BMI1 = 1 << 13;
        const BMI2 = 1 << 14;
        const FMA = 1 << 15;
        const LZCNT = 1 << 16;
        const PCLMULQDQ = 1 << 17;
        const POPCNT = 1 << 18;
        const SSE = 1 << 19;
        const SSE2 = 1 << 20;
        const SSE3 = 1 << 21;
        const SSE41 = 1 << 22;
        const SSE42 = 1 << 23;
        const SSSE3 = 1 << 24;

        const MARKERS = Self::ARM.bits() | Self::X86.bits();

        const ARM_EXTENSIONS = Self::ADV_SIMD.bits()
            | Self::ARM_AES.bits()
            | Self::CRC32.bits()
            | Self::DP.bits()
            | Self::RDM.bits()
            | Self::SHA1.bits()
            | Self::SHA256.bits();

        const X86_EXTENSIONS = Self::X86_AES.bits()
            | Self::AVX.bits()
            | Self::AVX2.bits()
            | Self::BMI1.bits()
            | Self::BMI2.bits()
            | Self::FMA.bits()
            | Self::LZCNT.bits()
            | Self::PCLMULQDQ.bits()
            | Self::POPCNT.bits()
            | Self::SSE.bits()
            | Self::SSE2.bits()
            | Self::SSE3.bits()
            | Self::SSE41.bits()
            | Self::SSE42.bits()
            | Self::SSSE3.bits();
    }
}

impl FeatureSet {
    /// The family marked in this set.
    /// Returns `None` if neither or both markers are set.
    pub fn architecture(&self) -> Option<Architecture> {
        let arm = self.contains(FeatureSet::ARM);
        let x86 = self.contains(FeatureSet::X86);
        match (arm, x86) {
            (true, false) => Some(Architecture::Arm),
            (false, true) => Some(Architecture::X86),
            _ => None,
        }
    }

    /// Extension bits only (markers and `IS_64_BIT` stripped).
    pub fn extensions(&self) -> FeatureSet {
        self.intersection(FeatureSet::ARM_EXTENSIONS | FeatureSet::X86_EXTENSIONS)
    }

    pub fn is_64_bit(&self) -> bool {
        self.contains(FeatureSet::IS_64_BIT)
    }

    /// True if exactly one family marker is set and every extension bit
    /// belongs to that family.
    pub fn is_well_formed(&self) -> bool {
        match self.architecture() {
            Some(arch) => arch.extensions().contains(self.extensions()),
            None => false,
        }
    }
}
