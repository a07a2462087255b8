use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The closed set of selectable digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "blake2b")]
    Blake2b,
    #[serde(rename = "blake2s")]
    Blake2s,
    #[serde(rename = "pbkdf2_hmac")]
    Pbkdf2Hmac,
    #[serde(rename = "md5")]
    Md5,
    #[serde(rename = "sha1")]
    Sha1,
    #[serde(rename = "sha224")]
    Sha224,
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha384")]
    Sha384,
    #[serde(rename = "sha3_224")]
    Sha3_224,
    #[serde(rename = "sha3_256")]
    Sha3_256,
    #[serde(rename = "sha3_384")]
    Sha3_384,
    #[serde(rename = "sha3_512")]
    Sha3_512,
    #[serde(rename = "sha512")]
    Sha512,
    #[serde(rename = "shake_128")]
    Shake128,
    #[serde(rename = "shake_256")]
    Shake256,
}

impl Algorithm {
    /// Every id, in selection order.
    pub const ALL: &'static [Algorithm] = &[
        Algorithm::Blake2b,
        Algorithm::Blake2s,
        Algorithm::Pbkdf2Hmac,
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha3_224,
        Algorithm::Sha3_256,
        Algorithm::Sha3_384,
        Algorithm::Sha3_512,
        Algorithm::Sha512,
        Algorithm::Shake128,
        Algorithm::Shake256,
    ];

    /// Ids the default registry can dispatch. `pbkdf2_hmac` is a key
    /// derivation function and needs a password, salt and iteration count.
    pub const SUPPORTED: &'static [Algorithm] = &[
        Algorithm::Blake2b,
        Algorithm::Blake2s,
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha3_224,
        Algorithm::Sha3_256,
        Algorithm::Sha3_384,
        Algorithm::Sha3_512,
        Algorithm::Sha512,
        Algorithm::Shake128,
        Algorithm::Shake256,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Blake2b => "blake2b",
            Algorithm::Blake2s => "blake2s",
            Algorithm::Pbkdf2Hmac => "pbkdf2_hmac",
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha3_224 => "sha3_224",
            Algorithm::Sha3_256 => "sha3_256",
            Algorithm::Sha3_384 => "sha3_384",
            Algorithm::Sha3_512 => "sha3_512",
            Algorithm::Sha512 => "sha512",
            Algorithm::Shake128 => "shake_128",
            Algorithm::Shake256 => "shake_256",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::Blake2b => "BLAKE2b-512, fast and secure on 64-bit platforms",
            Algorithm::Blake2s => "BLAKE2s-256, tuned for 8 to 32-bit platforms",
            Algorithm::Pbkdf2Hmac => "Key derivation function, not a file digest",
            Algorithm::Md5 => "Legacy, not recommended for security",
            Algorithm::Sha1 => "Legacy, collisions are practical",
            Algorithm::Sha224 => "Truncated SHA-256",
            Algorithm::Sha256 => "Industry standard, widely used",
            Algorithm::Sha384 => "Truncated SHA-512",
            Algorithm::Sha3_224 => "SHA-3 standard, 224-bit output",
            Algorithm::Sha3_256 => "SHA-3 standard, 256-bit output",
            Algorithm::Sha3_384 => "SHA-3 standard, 384-bit output",
            Algorithm::Sha3_512 => "SHA-3 standard, 512-bit output",
            Algorithm::Sha512 => "Higher security, larger output",
            Algorithm::Shake128 => "SHA-3 XOF, 256-bit output",
            Algorithm::Shake256 => "SHA-3 XOF, 512-bit output",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| HashError::UnsupportedAlgorithm {
                algorithm: s.to_string(),
            })
    }
}

/// Outcome of one full-file scan. Only built after the whole file was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestResult {
    algorithm: Algorithm,
    hex_digest: String,
    source_path: PathBuf,
}

impl DigestResult {
    pub(crate) fn new(algorithm: Algorithm, hex_digest: String, source_path: PathBuf) -> Self {
        Self {
            algorithm,
            hex_digest,
            source_path,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Lowercase hexadecimal digest.
    pub fn hex_digest(&self) -> &str {
        &self.hex_digest
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn file_name(&self) -> &str {
        self.source_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("file")
    }
}

/// Lifecycle of a hash job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Result of checking a computed digest against a reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
    NoReference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for algo in Algorithm::ALL {
            assert_eq!(algo.name().parse::<Algorithm>().unwrap(), *algo);
        }
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = "blake3".parse::<Algorithm>().unwrap_err();
        assert!(err.is_configuration());
        // ids are exact, no case folding
        assert!("SHA256".parse::<Algorithm>().is_err());
    }

    #[test]
    fn supported_excludes_only_pbkdf2() {
        assert_eq!(Algorithm::ALL.len(), 15);
        assert_eq!(Algorithm::SUPPORTED.len(), 14);
        assert!(!Algorithm::SUPPORTED.contains(&Algorithm::Pbkdf2Hmac));
    }

    #[test]
    fn terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }
}
