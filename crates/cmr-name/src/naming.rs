//! Component naming rules
//!
//! The default rules deciding whether a string may be used as a model
//! component name. Registries can override them per component type.

/// Separator used by nested component names (`parent::child`)
pub const NAME_PATH_SEPARATOR: &str = "::";

/// Code points that may not start a component name
const FORBIDDEN_FIRST: &[char] = &['(', ')', '[', ']', '{', '}', '"', '\''];

/// Check a name against the default component naming rules
///
/// A valid name is non-empty after trimming, contains no control
/// characters or Unicode noncharacters, does not start with a bracket or
/// quote, and does not contain the nested name separator.
#[must_use]
pub fn is_valid_component_name(name: &str) -> bool {
    let trimmed = name.trim();
    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    if FORBIDDEN_FIRST.contains(&first) {
        return false;
    }
    if trimmed.contains(NAME_PATH_SEPARATOR) {
        return false;
    }
    !trimmed.chars().any(is_forbidden_code_point)
}

/// Check a file path against the rules for embedded file names
#[must_use]
pub fn is_valid_file_path(path: &str) -> bool {
    let trimmed = path.trim();
    !trimmed.is_empty() && !trimmed.chars().any(is_forbidden_code_point)
}

fn is_forbidden_code_point(c: char) -> bool {
    // whitespace control characters are collapsed before validation
    if c.is_control() && !c.is_whitespace() {
        return true;
    }
    let cp = u32::from(c);
    (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE
}
