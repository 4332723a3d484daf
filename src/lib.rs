//! Runtime detection of ARM and x86 instruction-set extensions.
//!
//! ```no_run
//! use isa_probe::FeatureSet;
//!
//! let features = isa_probe::detect();
//! if features.contains(FeatureSet::AVX2 | FeatureSet::FMA) {
//!     // pick the vectorized path
//! }
//! ```

pub mod core;

pub use crate::core::detector::{detect, probe_arm, probe_x86, Detector};
pub use crate::core::flags::{Architecture, FeatureSet};
pub use crate::core::hardware::{ArchProvider, ArmProvider, HostArch, HostArm, HostX86, X86Provider};
pub use crate::core::report::{FeatureReport, ParseFeatureError};
