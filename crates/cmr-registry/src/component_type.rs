//! Component types and their naming traits
//!
//! [`ComponentType`] enumerates the kinds of model components a registry
//! tracks. Whether a type carries a positional index is intrinsic to the
//! type; the naming rules are supplied through [`ComponentTypeTraits`] so a
//! host can tighten them.

use cmr_name::{naming, normalize, NameFingerprint};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Kind of model component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ComponentType {
    /// No type; never stored
    #[default]
    Unset,
    /// Bitmap image
    Image,
    /// Texture mapping
    TextureMapping,
    /// Render material
    Material,
    /// Line pattern (linetype)
    LinePattern,
    /// Layer
    Layer,
    /// Object group
    Group,
    /// Text style
    TextStyle,
    /// Dimension style
    DimStyle,
    /// Render light
    RenderLight,
    /// Hatch pattern
    HatchPattern,
    /// Instance (block) definition
    InstanceDefinition,
    /// Geometric object
    ModelGeometry,
    /// Construction history record
    HistoryRecord,
    /// Render content
    RenderContent,
    /// Embedded file, named by its full path
    EmbeddedFile,
    /// Render post effect
    PostEffect,
    /// Section style
    SectionStyle,
    /// Several types at once; never stored
    Mixed,
}

impl ComponentType {
    /// Every type a registry can store, in table order
    pub const STORABLE: [ComponentType; 17] = [
        Self::Image,
        Self::TextureMapping,
        Self::Material,
        Self::LinePattern,
        Self::Layer,
        Self::Group,
        Self::TextStyle,
        Self::DimStyle,
        Self::RenderLight,
        Self::HatchPattern,
        Self::InstanceDefinition,
        Self::ModelGeometry,
        Self::HistoryRecord,
        Self::RenderContent,
        Self::EmbeddedFile,
        Self::PostEffect,
        Self::SectionStyle,
    ];

    /// Position of this type's table, `None` for `Unset` and `Mixed`
    #[must_use]
    pub fn slot(self) -> Option<usize> {
        Self::STORABLE.iter().position(|&t| t == self)
    }

    /// True for types a registry can store
    #[inline]
    #[must_use]
    pub fn is_storable(self) -> bool {
        !matches!(self, Self::Unset | Self::Mixed)
    }

    /// True for types whose items carry a dense positional index
    #[must_use]
    pub fn index_required(self) -> bool {
        matches!(
            self,
            Self::Image
                | Self::TextureMapping
                | Self::Material
                | Self::LinePattern
                | Self::Layer
                | Self::Group
                | Self::TextStyle
                | Self::DimStyle
                | Self::RenderLight
                | Self::HatchPattern
                | Self::InstanceDefinition
                | Self::SectionStyle
        )
    }

    /// True for types named by a file path instead of a display name
    #[inline]
    #[must_use]
    pub fn uses_file_path_names(self) -> bool {
        self == Self::EmbeddedFile
    }

    /// Human readable name of the type
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Unset => "Unset",
            Self::Image => "Image",
            Self::TextureMapping => "Texture Mapping",
            Self::Material => "Material",
            Self::LinePattern => "Line Pattern",
            Self::Layer => "Layer",
            Self::Group => "Group",
            Self::TextStyle => "Text Style",
            Self::DimStyle => "Dimension Style",
            Self::RenderLight => "Light",
            Self::HatchPattern => "Hatch Pattern",
            Self::InstanceDefinition => "Block",
            Self::ModelGeometry => "Object",
            Self::HistoryRecord => "History Record",
            Self::RenderContent => "Render Content",
            Self::EmbeddedFile => "Embedded File",
            Self::PostEffect => "Post Effect",
            Self::SectionStyle => "Section Style",
            Self::Mixed => "Mixed",
        }
    }
}

impl Display for ComponentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Naming rules of component types
///
/// Every method has the standard answer as its default, so an
/// implementation only overrides what it changes. Custom validity rules
/// can only be stricter than the rules [`NameFingerprint`] applies itself.
pub trait ComponentTypeTraits: fmt::Debug {
    /// Active items of the type must have distinct names
    fn unique_name_required(&self, component_type: ComponentType) -> bool {
        !matches!(
            component_type,
            ComponentType::Unset
                | ComponentType::Mixed
                | ComponentType::Image
                | ComponentType::TextureMapping
                | ComponentType::RenderLight
                | ComponentType::ModelGeometry
                | ComponentType::HistoryRecord
        )
    }

    /// Names only need to be unique among siblings with the same parent
    fn unique_name_includes_parent(&self, component_type: ComponentType) -> bool {
        component_type == ComponentType::Layer
    }

    /// Names differing only in letter case collide
    fn unique_name_ignores_case(&self, component_type: ComponentType) -> bool {
        component_type.is_storable()
    }

    /// Built-in items of the type may carry names
    fn system_names_allowed(&self, component_type: ComponentType) -> bool {
        self.unique_name_required(component_type)
    }

    /// Check a candidate name for the type
    fn is_valid_name(&self, component_type: ComponentType, name: &str) -> bool {
        if component_type.uses_file_path_names() {
            naming::is_valid_file_path(name)
        } else {
            naming::is_valid_component_name(&normalize::collapse_whitespace(name))
        }
    }

    /// Base used when a name has to be synthesized from nothing
    fn default_name(&self, component_type: ComponentType) -> String {
        component_type.display_name().to_string()
    }

    /// Fingerprint of `name` scoped the way the type's uniqueness rule
    /// requires
    fn name_fingerprint(
        &self,
        component_type: ComponentType,
        parent_id: Uuid,
        name: &str,
    ) -> NameFingerprint {
        if name.trim().is_empty() {
            return NameFingerprint::EMPTY;
        }
        if !self.is_valid_name(component_type, name) {
            return NameFingerprint::INVALID;
        }
        if component_type.uses_file_path_names() {
            return NameFingerprint::create_file_path(name);
        }
        let scope = if self.unique_name_includes_parent(component_type) {
            parent_id
        } else {
            Uuid::nil()
        };
        NameFingerprint::create_with_case(scope, name, self.unique_name_ignores_case(component_type))
    }
}

/// The standard naming rules
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTypeTraits;

impl ComponentTypeTraits for StandardTypeTraits {}
