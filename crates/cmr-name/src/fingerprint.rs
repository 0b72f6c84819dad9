//! Parent-scoped name fingerprints
//!
//! Provides [`NameFingerprint`], the lookup key registries use for
//! component names. A fingerprint is a SHA-1 of the normalized name plus
//! the id of the parent scope it was created in.

use crate::digest::NameDigest;
use crate::naming;
use crate::normalize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Content hash of a normalized, parent-scoped name
///
/// # Structure
/// - `parent_id`: scope the name is unique in (nil for global scope)
/// - `flags`: normalized code point count in the low 31 bits, the
///   case-sensitive bit in bit 31, or [`NameFingerprint::FILE_PATH_FLAGS`]
/// - `digest`: SHA-1 of the normalized UTF-32 code points
///
/// Ordering is total: flags, then digest, with the parent scope as the
/// final tiebreak.
///
/// # Example
/// ```
/// use cmr_name::NameFingerprint;
/// use uuid::Uuid;
///
/// let a = NameFingerprint::create(Uuid::nil(), "  Default  Layer ");
/// let b = NameFingerprint::create(Uuid::nil(), "DEFAULT LAYER");
/// assert_eq!(a, b);
/// assert!(a.is_valid_and_not_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameFingerprint {
    parent_id: Uuid,
    flags: u32,
    digest: NameDigest,
}

impl NameFingerprint {
    /// Bit set in `flags` when the name was hashed case-sensitively
    pub const CASE_SENSITIVE_FLAG: u32 = 0x8000_0000;

    /// Mask selecting the code point count from `flags`
    pub const LENGTH_MASK: u32 = 0x7FFF_FFFF;

    /// `flags` value of file path fingerprints
    pub const FILE_PATH_FLAGS: u32 = 0xFFFF_FFFF;

    /// Fingerprint of "no name"
    pub const EMPTY: Self = Self {
        parent_id: Uuid::nil(),
        flags: 0,
        digest: NameDigest::EMPTY_CONTENT,
    };

    /// Fingerprint that has not been computed
    pub const UNSET: Self = Self {
        parent_id: Uuid::nil(),
        flags: 0,
        digest: NameDigest::ZERO,
    };

    /// Fingerprint of a name that could not be hashed
    pub const INVALID: Self = Self {
        parent_id: Uuid::nil(),
        flags: Self::LENGTH_MASK,
        digest: NameDigest::ZERO,
    };

    /// Case-insensitive fingerprint of `name` in the scope `parent_id`
    #[inline]
    #[must_use]
    pub fn create(parent_id: Uuid, name: &str) -> Self {
        Self::create_with_case(parent_id, name, true)
    }

    /// Case-sensitive fingerprint of `name` in the scope `parent_id`
    #[inline]
    #[must_use]
    pub fn create_case_sensitive(parent_id: Uuid, name: &str) -> Self {
        Self::create_with_case(parent_id, name, false)
    }

    /// Fingerprint of `name` in the scope `parent_id`
    ///
    /// Returns [`Self::EMPTY`] when nothing but whitespace remains after
    /// normalization and [`Self::INVALID`] when the name breaks the
    /// component naming rules.
    #[must_use]
    pub fn create_with_case(parent_id: Uuid, name: &str, ignore_case: bool) -> Self {
        let collapsed = normalize::collapse_whitespace(name);
        if collapsed.is_empty() {
            return Self::EMPTY;
        }
        if !naming::is_valid_component_name(&collapsed) {
            return Self::INVALID;
        }
        let code_points = normalize::code_points(&collapsed, ignore_case);
        let Some(count) = u32::try_from(code_points.len())
            .ok()
            .filter(|&count| count < Self::LENGTH_MASK)
        else {
            return Self::INVALID;
        };
        let flags = if ignore_case {
            count
        } else {
            count | Self::CASE_SENSITIVE_FLAG
        };
        Self {
            parent_id,
            flags,
            digest: NameDigest::compute_code_points(&code_points),
        }
    }

    /// Fingerprint of a UTF-8 encoded name
    #[must_use]
    pub fn create_from_utf8(parent_id: Uuid, bytes: &[u8], ignore_case: bool) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(name) => Self::create_with_case(parent_id, name, ignore_case),
            Err(_) => Self::INVALID,
        }
    }

    /// Fingerprint of a UTF-16 encoded name
    #[must_use]
    pub fn create_from_utf16(parent_id: Uuid, units: &[u16], ignore_case: bool) -> Self {
        match normalize::decode_utf16(units) {
            Some(name) => Self::create_with_case(parent_id, &name, ignore_case),
            None => Self::INVALID,
        }
    }

    /// Fingerprint of a UTF-32 encoded name
    #[must_use]
    pub fn create_from_utf32(parent_id: Uuid, units: &[u32], ignore_case: bool) -> Self {
        match normalize::decode_utf32(units) {
            Some(name) => Self::create_with_case(parent_id, &name, ignore_case),
            None => Self::INVALID,
        }
    }

    /// Fingerprint of an embedded file's full path
    ///
    /// File path fingerprints are never parent scoped and always fold case.
    #[must_use]
    pub fn create_file_path(path: &str) -> Self {
        if path.trim().is_empty() {
            return Self::EMPTY;
        }
        if !naming::is_valid_file_path(path) {
            return Self::INVALID;
        }
        Self {
            parent_id: Uuid::nil(),
            flags: Self::FILE_PATH_FLAGS,
            digest: NameDigest::compute_code_points(&normalize::file_path_code_points(path)),
        }
    }

    /// Scope the name was hashed in
    #[inline]
    #[must_use]
    pub fn parent_id(&self) -> Uuid {
        self.parent_id
    }

    /// Raw flags
    #[inline]
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// SHA-1 of the normalized name
    #[inline]
    #[must_use]
    pub fn digest(&self) -> &NameDigest {
        &self.digest
    }

    /// Number of normalized code points (0 for file paths and sentinels)
    #[inline]
    #[must_use]
    pub fn code_point_count(&self) -> u32 {
        if self.is_file_path_hash() || self.digest.is_zero() {
            0
        } else {
            self.flags & Self::LENGTH_MASK
        }
    }

    /// True when the name was hashed case-sensitively
    #[inline]
    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        !self.is_file_path_hash() && self.flags & Self::CASE_SENSITIVE_FLAG != 0
    }

    /// True for fingerprints usable as lookup keys
    #[inline]
    #[must_use]
    pub fn is_valid_and_not_empty(&self) -> bool {
        !self.digest.is_zero() && !self.is_empty_name_hash()
    }

    /// True for the fingerprint of "no name"
    #[inline]
    #[must_use]
    pub fn is_empty_name_hash(&self) -> bool {
        self.flags == 0 && self.digest == NameDigest::EMPTY_CONTENT
    }

    /// True when no usable digest exists (hashing failed or never ran)
    #[inline]
    #[must_use]
    pub fn is_invalid_name_hash(&self) -> bool {
        self.digest.is_zero()
    }

    /// True for [`Self::UNSET`]
    #[inline]
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }

    /// True for file path fingerprints
    #[inline]
    #[must_use]
    pub fn is_file_path_hash(&self) -> bool {
        self.flags == Self::FILE_PATH_FLAGS
    }

    /// Same fingerprint moved to another scope
    #[inline]
    #[must_use]
    pub fn with_parent_id(&self, parent_id: Uuid) -> Self {
        Self { parent_id, ..*self }
    }

    /// Compare names while ignoring their scopes
    #[inline]
    #[must_use]
    pub fn eq_ignoring_parent(&self, other: &Self) -> bool {
        self.flags == other.flags && self.digest == other.digest
    }

    /// 32-bit key for bucket tables
    ///
    /// Equal fingerprints always produce equal keys.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn table_hash(&self) -> u32 {
        let (hi, lo) = self.parent_id.as_u64_pair();
        let parent = (hi ^ lo) as u32 ^ ((hi ^ lo) >> 32) as u32;
        self.digest.fold32() ^ self.flags.rotate_left(16) ^ parent
    }
}

impl Default for NameFingerprint {
    fn default() -> Self {
        Self::UNSET
    }
}

impl Ord for NameFingerprint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.flags
            .cmp(&other.flags)
            .then_with(|| self.digest.cmp(&other.digest))
            .then_with(|| self.parent_id.cmp(&other.parent_id))
    }
}

impl PartialOrd for NameFingerprint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for NameFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            f.write_str("<unset>")
        } else if self.is_invalid_name_hash() {
            f.write_str("<invalid>")
        } else if self.is_empty_name_hash() {
            f.write_str("<empty>")
        } else if self.parent_id.is_nil() {
            write!(f, "{}", self.digest)
        } else {
            write!(f, "{}/{}", self.parent_id, self.digest)
        }
    }
}
