//! Feature Detector
//!
//! Branches once on the architecture family, then runs that family's fixed
//! catalog of independent checks. Each supported extension ORs in its bit;
//! nothing is inferred from other flags (SSE4.2 does not imply SSE4.1 here).

use crate::core::flags::{Architecture, FeatureSet};
use crate::core::hardware::{ArchProvider, ArmProvider, HostArch, HostArm, HostX86, X86Provider};

/// Detect the extensions of the running processor.
///
/// Never fails: an unknown architecture yields exactly `FeatureSet::X86`.
/// The result is plain data; callers are free to cache it.
pub fn detect() -> FeatureSet {
    Detector::host().detect()
}

/// Run the ARM catalog against `provider`.
pub fn probe_arm<P: ArmProvider + ?Sized>(provider: &P) -> FeatureSet {
    let mut features = Architecture::Arm.marker();

    let checks: [(bool, FeatureSet); 8] = [
        (provider.is_64_bit(), FeatureSet::IS_64_BIT),
        (provider.adv_simd(), FeatureSet::ADV_SIMD),
        (provider.aes(), FeatureSet::ARM_AES),
        (provider.crc32(), FeatureSet::CRC32),
        (provider.dp(), FeatureSet::DP),
        (provider.rdm(), FeatureSet::RDM),
        (provider.sha1(), FeatureSet::SHA1),
        (provider.sha256(), FeatureSet::SHA256),
    ];

    for (supported, flag) in checks {
        if supported {
            features |= flag;
        }
    }
    features
}

/// Run the x86 catalog against `provider`.
pub fn probe_x86<P: X86Provider + ?Sized>(provider: &P) -> FeatureSet {
    let mut features = Architecture::X86.marker();

    let checks: [(bool, FeatureSet); 16] = [
        (provider.is_64_bit(), FeatureSet::IS_64_BIT),
        (provider.aes(), FeatureSet::X86_AES),
        (provider.avx(), FeatureSet::AVX),
        (provider.avx2(), FeatureSet::AVX2),
        (provider.bmi1(), FeatureSet::BMI1),
        (provider.bmi2(), FeatureSet::BMI2),
        (provider.fma(), FeatureSet::FMA),
        (provider.lzcnt(), FeatureSet::LZCNT),
        (provider.pclmulqdq(), FeatureSet::PCLMULQDQ),
        (provider.popcnt(), FeatureSet::POPCNT),
        (provider.sse(), FeatureSet::SSE),
        (provider.sse2(), FeatureSet::SSE2),
        (provider.sse3(), FeatureSet::SSE3),
        (provider.sse41(), FeatureSet::SSE41),
        (provider.sse42(), FeatureSet::SSE42),
        (provider.ssse3(), FeatureSet::SSSE3),
    ];

    for (supported, flag) in checks {
        if supported {
            features |= flag;
        }
    }
    features
}

/// Binds an architecture provider to one provider per family.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detector<P, A, X> {
    arch: P,
    arm: A,
    x86: X,
}

impl Detector<HostArch, HostArm, HostX86> {
    /// Detector backed by the running processor.
    pub fn host() -> Self {
        Self {
            arch: HostArch,
            arm: HostArm,
            x86: HostX86,
        }
    }
}

impl<P, A, X> Detector<P, A, X>
where
    P: ArchProvider,
    A: ArmProvider,
    X: X86Provider,
{
    pub fn new(arch: P, arm: A, x86: X) -> Self {
        Self { arch, arm, x86 }
    }

    pub fn detect(&self) -> FeatureSet {
        let features = match self.arch.architecture() {
            Some(Architecture::Arm) => probe_arm(&self.arm),
            Some(Architecture::X86) => probe_x86(&self.x86),
            None => {
                tracing::warn!("unrecognised architecture, reporting bare x86");
                Architecture::X86.marker()
            }
        };
        tracing::debug!(bits = features.bits(), ?features, "detected cpu features");
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Environment that claims exactly the bits in `claims`.
    /// `IS_64_BIT` stands in for both X64 and Arm64.
    #[derive(Clone, Copy)]
    struct Fake {
        arch: Option<Architecture>,
        claims: FeatureSet,
    }

    impl Fake {
        fn has(&self, flag: FeatureSet) -> bool {
            self.claims.contains(flag)
        }
    }

    impl ArchProvider for Fake {
        fn architecture(&self) -> Option<Architecture> {
            self.arch
        }
    }

    impl ArmProvider for Fake {
        fn is_64_bit(&self) -> bool {
            self.has(FeatureSet::IS_64_BIT)
        }

        fn adv_simd(&self) -> bool {
            self.has(FeatureSet::ADV_SIMD)
        }

        fn aes(&self) -> bool {
            self.has(FeatureSet::ARM_AES)
        }

        fn crc32(&self) -> bool {
            self.has(FeatureSet::CRC32)
        }

        fn dp(&self) -> bool {
            self.has(FeatureSet::DP)
        }

        fn rdm(&self) -> bool {
            self.has(FeatureSet::RDM)
        }

        fn sha1(&self) -> bool {
            self.has(FeatureSet::SHA1)
        }

        fn sha256(&self) -> bool {
            self.has(FeatureSet::SHA256)
        }
    }

    impl X86Provider for Fake {
        fn is_64_bit(&self) -> bool {
            self.has(FeatureSet::IS_64_BIT)
        }

        fn aes(&self) -> bool {
            self.has(FeatureSet::X86_AES)
        }

        fn avx(&self) -> bool {
            self.has(FeatureSet::AVX)
        }

        fn avx2(&self) -> bool {
            self.has(FeatureSet::AVX2)
        }

        fn bmi1(&self) -> bool {
            self.has(FeatureSet::BMI1)
        }

        fn bmi2(&self) -> bool {
            self.has(FeatureSet::BMI2)
        }

        fn fma(&self) -> bool {
            self.has(FeatureSet::FMA)
        }

        fn lzcnt(&self) -> bool {
            self.has(FeatureSet::LZCNT)
        }

        fn pclmulqdq(&self) -> bool {
            self.has(FeatureSet::PCLMULQDQ)
        }

        fn popcnt(&self) -> bool {
            self.has(FeatureSet::POPCNT)
        }

        fn sse(&self) -> bool {
            self.has(FeatureSet::SSE)
        }

        fn sse2(&self) -> bool {
            self.has(FeatureSet::SSE2)
        }

        fn sse3(&self) -> bool {
            self.has(FeatureSet::SSE3)
        }

        fn sse41(&self) -> bool {
            self.has(FeatureSet::SSE41)
        }

        fn sse42(&self) -> bool {
            self.has(FeatureSet::SSE42)
        }

        fn ssse3(&self) -> bool {
            self.has(FeatureSet::SSSE3)
        }
    }

    fn claiming(claims: FeatureSet) -> Fake {
        Fake { arch: None, claims }
    }

    fn detector(arch: Option<Architecture>, claims: FeatureSet) -> Detector<Fake, Fake, Fake> {
        let fake = Fake { arch, claims };
        Detector::new(fake, fake, fake)
    }

    #[test]
    fn test_x86_64_scenario() {
        let claims = FeatureSet::IS_64_BIT
            | FeatureSet::SSE
            | FeatureSet::SSE2
            | FeatureSet::AVX2
            | FeatureSet::POPCNT;
        let features = detector(Some(Architecture::X86), claims).detect();

        assert_eq!(
            features,
            FeatureSet::X86
                | FeatureSet::IS_64_BIT
                | FeatureSet::SSE
                | FeatureSet::SSE2
                | FeatureSet::AVX2
                | FeatureSet::POPCNT
        );
    }

    #[test]
    fn test_arm64_scenario() {
        let claims = FeatureSet::IS_64_BIT | FeatureSet::ADV_SIMD | FeatureSet::ARM_AES;
        let features = detector(Some(Architecture::Arm), claims).detect();

        assert_eq!(
            features,
            FeatureSet::ARM | FeatureSet::IS_64_BIT | FeatureSet::ADV_SIMD | FeatureSet::ARM_AES
        );
        assert!(!features.contains(FeatureSet::X86_AES));
    }

    #[test]
    fn test_bare_x86_32() {
        let features = detector(Some(Architecture::X86), FeatureSet::empty()).detect();
        assert_eq!(features, FeatureSet::X86);
    }

    #[test]
    fn test_bare_arm_32() {
        let features = detector(Some(Architecture::Arm), FeatureSet::empty()).detect();
        assert_eq!(features, FeatureSet::ARM);
    }

    #[test]
    fn test_unknown_architecture_falls_back_to_x86() {
        // Even a provider claiming everything must not leak extension bits.
        let features = detector(None, FeatureSet::all()).detect();
        assert_eq!(features, FeatureSet::X86);
    }

    #[test]
    fn test_fma_has_its_own_bit() {
        let fma_only = probe_x86(&claiming(FeatureSet::FMA));
        assert_eq!(fma_only, FeatureSet::X86 | FeatureSet::FMA);
        assert!(!fma_only.contains(FeatureSet::BMI2));

        let bmi2_only = probe_x86(&claiming(FeatureSet::BMI2));
        assert_eq!(bmi2_only, FeatureSet::X86 | FeatureSet::BMI2);
        assert!(!bmi2_only.contains(FeatureSet::FMA));
    }

    #[test]
    fn test_no_implied_flags() {
        // SSE4.2 without SSE4.1 is reported as-is.
        let features = probe_x86(&claiming(FeatureSet::SSE42));
        assert_eq!(features, FeatureSet::X86 | FeatureSet::SSE42);
    }

    #[test]
    fn test_foreign_claims_are_ignored() {
        // An x86 environment that somehow claims ARM bits still yields a clean x86 set.
        let everything = FeatureSet::all();

        let x86 = detector(Some(Architecture::X86), everything).detect();
        assert_eq!(x86, FeatureSet::X86 | FeatureSet::IS_64_BIT | FeatureSet::X86_EXTENSIONS);
        assert!(x86.is_well_formed());

        let arm = detector(Some(Architecture::Arm), everything).detect();
        assert_eq!(arm, FeatureSet::ARM | FeatureSet::IS_64_BIT | FeatureSet::ARM_EXTENSIONS);
        assert!(arm.is_well_formed());
    }

    #[test]
    fn test_every_catalog_entry_round_trips() {
        for flag in FeatureSet::X86_EXTENSIONS.iter() {
            let features = probe_x86(&claiming(flag));
            assert_eq!(features, FeatureSet::X86 | flag);
        }
        for flag in FeatureSet::ARM_EXTENSIONS.iter() {
            let features = probe_arm(&claiming(flag));
            assert_eq!(features, FeatureSet::ARM | flag);
        }
    }

    #[test]
    fn test_host_detect_is_well_formed() {
        let features = detect();
        assert!(features.is_well_formed());
        assert_eq!(features, Detector::host().detect());
    }
}
