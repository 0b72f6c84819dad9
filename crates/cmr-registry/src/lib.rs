//! CMR Component Registry
//!
//! Stable identity (type, index, id, name) for the components of a model.
//!
//! # Overview
//!
//! - **ComponentRegistry**: per-type tables plus id, name and runtime
//!   serial number indices; add, soft delete, undelete, rename
//! - **ComponentTypeTraits**: per-type naming rules
//! - **RegistryFactory**: numbers registries and runtime objects
//! - **Arena** / **BucketTable**: handle-addressed storage the registry is
//!   built from
//!
//! # Example
//!
//! ```rust
//! use cmr_registry::{ComponentType, NewComponent, RegistryFactory};
//!
//! let mut factory = RegistryFactory::new();
//! let mut registry = factory.create_registry();
//!
//! let serial = factory.next_runtime_serial_number();
//! let added = registry
//!     .add_component(
//!         NewComponent::new(ComponentType::Layer)
//!             .with_name("Walls")
//!             .with_runtime_serial_number(serial),
//!         false,
//!     )
//!     .unwrap();
//!
//! let id = added.item.id();
//! registry.delete_component(id).unwrap();
//! assert!(registry.item_from_id(id).unwrap().is_deleted());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod arena;
pub mod bucket_table;
mod component_type;
mod config;
mod error;
mod factory;
mod item;
mod registry;
mod table_index;
mod unused_name;

// Re-exports
pub use component_type::{ComponentType, ComponentTypeTraits, StandardTypeTraits};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use factory::RegistryFactory;
pub use item::{AddedComponent, ComponentName, ItemStatus, ManifestItem, NewComponent, SystemComponent};
pub use registry::ComponentRegistry;
pub use table_index::Items;

pub use cmr_name::NameFingerprint;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
