//! CMR Merge Maps
//!
//! Translate component references between two registries during a merge.
//!
//! # Example
//!
//! ```rust
//! use cmr_merge::{CrossRegistryMap, MapItem};
//! use cmr_registry::{ComponentRegistry, ComponentType, NewComponent};
//!
//! let mut source = ComponentRegistry::new();
//! let mut destination = ComponentRegistry::new();
//! let walls = NewComponent::new(ComponentType::Layer).with_name("Walls");
//! let from = source.add_component(walls.clone(), false).unwrap().item;
//! let to = destination.add_component(walls, true).unwrap().item;
//!
//! let mut map = CrossRegistryMap::new();
//! map.add_map_item(MapItem::from_items(&from, &to).unwrap()).unwrap();
//!
//! let index = map.get_and_validate_destination_index(ComponentType::Layer, 0, &destination);
//! assert_eq!(index, to.index());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod map;
mod map_item;

// Re-exports
pub use error::MapError;
pub use map::CrossRegistryMap;
pub use map_item::MapItem;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
