use crate::core::flags::{Architecture, FeatureSet};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFeatureError {
    #[error("Unknown feature name: {0}")]
    Unknown(String),
    #[error("Empty feature name")]
    Empty,
}

/// Display name and accepted aliases (already normalized) per extension.
const ARM_NAMES: &[(FeatureSet, &str, &[&str])] = &[
    (FeatureSet::ADV_SIMD, "advsimd", &["neon", "asimd"]),
    (FeatureSet::ARM_AES, "aes", &[]),
    (FeatureSet::CRC32, "crc32", &["crc"]),
    (FeatureSet::DP, "dp", &["dotprod"]),
    (FeatureSet::RDM, "rdm", &[]),
    (FeatureSet::SHA1, "sha1", &[]),
    (FeatureSet::SHA256, "sha256", &[]),
];

const X86_NAMES: &[(FeatureSet, &str, &[&str])] = &[
    (FeatureSet::X86_AES, "aes", &["aesni"]),
    (FeatureSet::AVX, "avx", &[]),
    (FeatureSet::AVX2, "avx2", &[]),
    (FeatureSet::BMI1, "bmi1", &["bmi"]),
    (FeatureSet::BMI2, "bmi2", &[]),
    (FeatureSet::FMA, "fma", &["fma3"]),
    (FeatureSet::LZCNT, "lzcnt", &["abm"]),
    (FeatureSet::PCLMULQDQ, "pclmulqdq", &["pclmul"]),
    (FeatureSet::POPCNT, "popcnt", &[]),
    (FeatureSet::SSE, "sse", &[]),
    (FeatureSet::SSE2, "sse2", &[]),
    (FeatureSet::SSE3, "sse3", &[]),
    (FeatureSet::SSE41, "sse4.1", &[]),
    (FeatureSet::SSE42, "sse4.2", &[]),
    (FeatureSet::SSSE3, "ssse3", &[]),
];

type NameTable = &'static [(FeatureSet, &'static str, &'static [&'static str])];

fn names_for(arch: Architecture) -> NameTable {
    match arch {
        Architecture::Arm => ARM_NAMES,
        Architecture::X86 => X86_NAMES,
    }
}

// "SSE4_1", "sse4.1" and "Sse41" all normalize to "sse41".
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn lookup(key: &str, arch: Architecture) -> Option<FeatureSet> {
    names_for(arch)
        .iter()
        .find(|(_, name, aliases)| normalize(name) == key || aliases.contains(&key))
        .map(|(flag, _, _)| *flag)
}

impl FeatureSet {
    /// Resolve a single extension name.
    ///
    /// Names shared by both families (`aes`) resolve to `arch`'s bit. Names
    /// from the other family still resolve, to that family's bit.
    pub fn parse_name(name: &str, arch: Architecture) -> Result<FeatureSet, ParseFeatureError> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(ParseFeatureError::Empty);
        }
        match key.as_str() {
            "arm" => return Ok(FeatureSet::ARM),
            "x86" => return Ok(FeatureSet::X86),
            "64bit" | "is64bit" => return Ok(FeatureSet::IS_64_BIT),
            _ => {}
        }

        let other = match arch {
            Architecture::Arm => Architecture::X86,
            Architecture::X86 => Architecture::Arm,
        };
        lookup(&key, arch)
            .or_else(|| lookup(&key, other))
            .ok_or_else(|| ParseFeatureError::Unknown(name.trim().to_string()))
    }

    /// Parse a comma-separated list of extension names into one set.
    pub fn parse_list(list: &str, arch: Architecture) -> Result<FeatureSet, ParseFeatureError> {
        let mut features = FeatureSet::empty();
        for name in list.split(',') {
            features |= FeatureSet::parse_name(name, arch)?;
        }
        Ok(features)
    }

    /// Display names of the extension bits, ARM catalog first, then x86.
    /// Markers and `IS_64_BIT` are not listed.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for arch in [Architecture::Arm, Architecture::X86] {
            for (flag, name, _) in names_for(arch) {
                if self.contains(*flag) {
                    names.push(*name);
                }
            }
        }
        names
    }

    /// Names of everything in `required` that this set lacks, spelled the
    /// way `parse_name` accepts them.
    pub fn missing_names(&self, required: FeatureSet) -> Vec<&'static str> {
        let missing = required.difference(*self);
        let mut names = Vec::new();
        for (flag, name) in [
            (FeatureSet::ARM, "arm"),
            (FeatureSet::X86, "x86"),
            (FeatureSet::IS_64_BIT, "64bit"),
        ] {
            if missing.contains(flag) {
                names.push(name);
            }
        }
        names.extend(missing.names());
        names
    }

    /// Human-readable summary, e.g. `x86 (64-bit): sse, sse2, avx2`.
    pub fn describe(&self) -> String {
        FeatureReport::from(*self).to_string()
    }
}

/// Serializable view of a `FeatureSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureReport {
    pub architecture: Option<Architecture>,
    pub is_64_bit: bool,
    pub bits: u32,
    pub extensions: Vec<&'static str>,
}

impl From<FeatureSet> for FeatureReport {
    fn from(features: FeatureSet) -> Self {
        Self {
            architecture: features.architecture(),
            is_64_bit: features.is_64_bit(),
            bits: features.bits(),
            extensions: features.names(),
        }
    }
}

impl fmt::Display for FeatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.architecture {
            Some(arch) => write!(f, "{}", arch)?,
            None => write!(f, "unknown")?,
        }
        let width = if self.is_64_bit { "64-bit" } else { "32-bit" };
        write!(f, " ({}): ", width)?;
        if self.extensions.is_empty() {
            write!(f, "no extensions")
        } else {
            write!(f, "{}", self.extensions.join(", "))
        }
    }
}
