//! CMR Name System
//!
//! Canonical, parent-scoped fingerprints of model component names.
//!
//! # Core Concepts
//!
//! - [`NameFingerprint`]: SHA-1 of a normalized name plus its parent scope
//! - [`NameDigest`]: 20-byte SHA-1 digest
//! - [`naming`]: default component naming rules
//! - [`normalize`]: whitespace collapsing and case folding
//!
//! # Example
//!
//! ```rust
//! use cmr_name::NameFingerprint;
//! use uuid::Uuid;
//!
//! let layer = Uuid::new_v4();
//! let a = NameFingerprint::create(layer, "Walls");
//! let b = NameFingerprint::create(Uuid::nil(), "Walls");
//!
//! // Same name, different scope
//! assert_ne!(a, b);
//! assert!(a.eq_ignoring_parent(&b));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod digest;
mod fingerprint;
pub mod naming;
pub mod normalize;

// Re-exports
pub use digest::{NameDigest, NameError, DIGEST_LEN};
pub use fingerprint::NameFingerprint;
pub use naming::{is_valid_component_name, is_valid_file_path, NAME_PATH_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
