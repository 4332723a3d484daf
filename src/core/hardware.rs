//! Hardware Detection Module
//! Capability providers: one boolean query per catalog entry.
//!
//! The host providers answer from `std::arch` runtime detection. Any query the
//! host can't answer (wrong architecture, unstable detection) answers `false`.

use crate::core::flags::Architecture;

/// Answers which architecture family the process is running on.
pub trait ArchProvider {
    fn architecture(&self) -> Option<Architecture>;
}

/// Per-extension queries for ARM processors.
pub trait ArmProvider {
    fn is_64_bit(&self) -> bool;
    fn adv_simd(&self) -> bool;
    fn aes(&self) -> bool;
    fn crc32(&self) -> bool;
    fn dp(&self) -> bool;
    fn rdm(&self) -> bool;
    fn sha1(&self) -> bool;
    fn sha256(&self) -> bool;
}

/// Per-extension queries for x86 processors.
pub trait X86Provider {
    fn is_64_bit(&self) -> bool;
    fn aes(&self) -> bool;
    fn avx(&self) -> bool;
    fn avx2(&self) -> bool;
    fn bmi1(&self) -> bool;
    fn bmi2(&self) -> bool;
    fn fma(&self) -> bool;
    fn lzcnt(&self) -> bool;
    fn pclmulqdq(&self) -> bool;
    fn popcnt(&self) -> bool;
    fn sse(&self) -> bool;
    fn sse2(&self) -> bool;
    fn sse3(&self) -> bool;
    fn sse41(&self) -> bool;
    fn sse42(&self) -> bool;
    fn ssse3(&self) -> bool;
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
macro_rules! x86_detected {
    ($feature:tt) => {
        std::arch::is_x86_feature_detected!($feature)
    };
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
macro_rules! x86_detected {
    ($feature:tt) => {
        false
    };
}

// is_arm_feature_detected! is still unstable, so 32-bit ARM under-reports.
#[cfg(target_arch = "aarch64")]
macro_rules! arm_detected {
    ($feature:tt) => {
        std::arch::is_aarch64_feature_detected!($feature)
    };
}

#[cfg(not(target_arch = "aarch64"))]
macro_rules! arm_detected {
    ($feature:tt) => {
        false
    };
}

/// Architecture family of the compilation target.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostArch;

impl ArchProvider for HostArch {
    fn architecture(&self) -> Option<Architecture> {
        if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
            Some(Architecture::Arm)
        } else if cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            Some(Architecture::X86)
        } else {
            None
        }
    }
}

/// ARM extensions of the running processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostArm;

impl ArmProvider for HostArm {
    fn is_64_bit(&self) -> bool {
        cfg!(target_arch = "aarch64")
    }

    fn adv_simd(&self) -> bool {
        arm_detected!("neon")
    }

    fn aes(&self) -> bool {
        arm_detected!("aes")
    }

    fn crc32(&self) -> bool {
        arm_detected!("crc")
    }

    fn dp(&self) -> bool {
        arm_detected!("dotprod")
    }

    fn rdm(&self) -> bool {
        arm_detected!("rdm")
    }

    // "sha2" on aarch64 covers both the SHA1 and SHA256 instructions.
    fn sha1(&self) -> bool {
        arm_detected!("sha2")
    }

    fn sha256(&self) -> bool {
        arm_detected!("sha2")
    }
}

/// x86 extensions of the running processor (CPUID via std).
#[derive(Debug, Clone, Copy, Default)]
pub struct HostX86;

impl X86Provider for HostX86 {
    fn is_64_bit(&self) -> bool {
        cfg!(target_arch = "x86_64")
    }

    fn aes(&self) -> bool {
        x86_detected!("aes")
    }

    fn avx(&self) -> bool {
        x86_detected!("avx")
    }

    fn avx2(&self) -> bool {
        x86_detected!("avx2")
    }

    fn bmi1(&self) -> bool {
        x86_detected!("bmi1")
    }

    fn bmi2(&self) -> bool {
        x86_detected!("bmi2")
    }

    fn fma(&self) -> bool {
        x86_detected!("fma")
    }

    fn lzcnt(&self) -> bool {
        x86_detected!("lzcnt")
    }

    fn pclmulqdq(&self) -> bool {
        x86_detected!("pclmulqdq")
    }

    fn popcnt(&self) -> bool {
        x86_detected!("popcnt")
    }

    fn sse(&self) -> bool {
        x86_detected!("sse")
    }

    fn sse2(&self) -> bool {
        x86_detected!("sse2")
    }

    fn sse3(&self) -> bool {
        x86_detected!("sse3")
    }

    fn sse41(&self) -> bool {
        x86_detected!("sse4.1")
    }

    fn sse42(&self) -> bool {
        x86_detected!("sse4.2")
    }

    fn ssse3(&self) -> bool {
        x86_detected!("ssse3")
    }
}
