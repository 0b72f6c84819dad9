//! SHA-1 digest primitive
//!
//! Provides [`NameDigest`], the 20-byte digest carried by every
//! [`NameFingerprint`](crate::NameFingerprint).

use sha1::{Digest, Sha1};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of bytes in a SHA-1 digest
pub const DIGEST_LEN: usize = 20;

/// A 20-byte SHA-1 digest
///
/// Immutable and cheap to copy. The all-zero digest is reserved for
/// "no digest was computed" and never produced by [`NameDigest::compute`]
/// in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameDigest([u8; DIGEST_LEN]);

impl NameDigest {
    /// The all-zero digest
    pub const ZERO: Self = Self([0; DIGEST_LEN]);

    /// SHA-1 of zero bytes of input
    pub const EMPTY_CONTENT: Self = Self([
        0xda, 0x39, 0xa3, 0xee, 0x5e, 0x6b, 0x4b, 0x0d, 0x32, 0x55, 0xbf, 0xef, 0x95, 0x60, 0x18,
        0x90, 0xaf, 0xd8, 0x07, 0x09,
    ]);

    /// Create a digest from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Create digest from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NameError> {
        let arr: [u8; DIGEST_LEN] =
            bytes.try_into().map_err(|_| NameError::InvalidLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// SHA-1 of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::from_output(&Sha1::digest(data))
    }

    /// SHA-1 of a code point sequence
    ///
    /// Each code point is fed as four little-endian bytes so the digest
    /// does not depend on the host byte order.
    #[must_use]
    pub fn compute_code_points(code_points: &[char]) -> Self {
        let mut hasher = Sha1::new();
        for &c in code_points {
            hasher.update(u32::from(c).to_le_bytes());
        }
        Self::from_output(&hasher.finalize())
    }

    fn from_output(output: &[u8]) -> Self {
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(output);
        Self(arr)
    }

    /// Short string representation (first 8 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Check if digest is all zeros
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; DIGEST_LEN]
    }

    /// Fold the digest into 32 bits
    #[inline]
    #[must_use]
    pub fn fold32(&self) -> u32 {
        self.0
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .fold(0, |acc, word| acc.rotate_left(5) ^ word)
    }
}

impl Display for NameDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for NameDigest {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl Default for NameDigest {
    fn default() -> Self {
        Self::ZERO
    }
}

impl serde::Serialize for NameDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> serde::Deserialize<'de> for NameDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct NameDigestVisitor;

        impl<'de> serde::de::Visitor<'de> for NameDigestVisitor {
            type Value = NameDigest;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 20-byte digest as hex string or byte array")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                NameDigest::from_slice(value).map_err(serde::de::Error::custom)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut arr = [0u8; DIGEST_LEN];
                for (i, byte) in arr.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &"20 bytes"))?;
                }
                Ok(NameDigest::new(arr))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(NameDigestVisitor)
        } else {
            deserializer.deserialize_bytes(NameDigestVisitor)
        }
    }
}

/// Errors that can occur when decoding digests and fingerprints
#[derive(Debug, thiserror::Error)]
pub enum NameError {
    /// Invalid digest length
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
