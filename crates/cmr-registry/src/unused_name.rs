//! Unused-name synthesis
//!
//! Builds candidate names `base + separator + suffix` until one is
//! available. Suffixes are tried in three rounds: a two-digit counter,
//! random 8-hex-digit values, and finally a dashless UUID.

use crate::component_type::{ComponentType, ComponentTypeTraits};
use crate::error::{RegistryError, Result};
use tracing::{error, trace};
use uuid::Uuid;

const TRAILING_SUFFIX_CHARS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ' ', '_', '-'];

/// Extra counter attempts beyond the type's index limit
const COUNTER_SLACK: usize = 20;

/// Parameters of one synthesis run
#[derive(Debug, Clone, Copy)]
pub(crate) struct SuffixPlan<'a> {
    pub(crate) separator: &'a str,
    /// First counter value
    pub(crate) seed: usize,
    /// Index limit (or item count) of the type
    pub(crate) index_limit: usize,
    pub(crate) random_attempts: usize,
}

/// Base for synthesized names
///
/// Prefers a valid explicit base, then the candidate with trailing digits
/// and separators removed, then the type's default name.
pub(crate) fn base_name<T: ComponentTypeTraits + ?Sized>(
    traits: &T,
    component_type: ComponentType,
    explicit_base: Option<&str>,
    candidate: Option<&str>,
) -> String {
    if let Some(base) = explicit_base.map(str::trim).filter(|b| !b.is_empty()) {
        if traits.is_valid_name(component_type, base) {
            return base.to_string();
        }
    }
    if let Some(stripped) = candidate
        .map(|c| c.trim().trim_end_matches(TRAILING_SUFFIX_CHARS))
        .filter(|s| !s.is_empty())
    {
        if traits.is_valid_name(component_type, stripped) {
            return stripped.to_string();
        }
    }
    traits.default_name(component_type)
}

/// First candidate built from `base` that `is_available` accepts
pub(crate) fn synthesize(
    base: &str,
    plan: SuffixPlan<'_>,
    mut is_available: impl FnMut(&str) -> bool,
) -> Result<String> {
    let sep = plan.separator;
    let counter_attempts = plan.index_limit + COUNTER_SLACK;
    for n in plan.seed..plan.seed + counter_attempts {
        let candidate = format!("{base}{sep}{n:02}");
        if is_available(&candidate) {
            return Ok(candidate);
        }
    }
    trace!(base, attempts = counter_attempts, "counter suffixes exhausted");

    for _ in 0..plan.random_attempts {
        let candidate = format!("{base}{sep}{:08X}", rand::random::<u32>());
        if is_available(&candidate) {
            return Ok(candidate);
        }
    }

    let candidate = format!("{base}{sep}{}", Uuid::new_v4().simple());
    if is_available(&candidate) {
        return Ok(candidate);
    }
    error!(base, "unable to synthesize an unused name");
    Err(RegistryError::NameSynthesisExhausted {
        base: base.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_type::StandardTypeTraits;

    fn plan(seed: usize, index_limit: usize) -> SuffixPlan<'static> {
        SuffixPlan {
            separator: " ",
            seed,
            index_limit,
            random_attempts: 4,
        }
    }

    #[test]
    fn base_prefers_explicit() {
        let base = base_name(&StandardTypeTraits, ComponentType::Layer, Some("Walls"), Some("Base 07"));
        assert_eq!(base, "Walls");
    }

    #[test]
    fn base_strips_trailing_counter() {
        let base = base_name(&StandardTypeTraits, ComponentType::Layer, None, Some(" Base 07 "));
        assert_eq!(base, "Base");
        let base = base_name(&StandardTypeTraits, ComponentType::Layer, Some("{bad}"), Some("Wall_-3"));
        assert_eq!(base, "Wall");
    }

    #[test]
    fn base_falls_back_to_default_name() {
        let base = base_name(&StandardTypeTraits, ComponentType::InstanceDefinition, None, Some("0042"));
        assert_eq!(base, "Block");
        let base = base_name(&StandardTypeTraits, ComponentType::Layer, None, None);
        assert_eq!(base, "Layer");
    }

    #[test]
    fn counter_starts_at_seed() {
        let name = synthesize("Base", plan(1, 0), |_| true).unwrap();
        assert_eq!(name, "Base 01");
    }

    #[test]
    fn counter_skips_taken_names() {
        let taken = ["Base 03", "Base 04"];
        let name = synthesize("Base", plan(3, 5), |c| !taken.contains(&c)).unwrap();
        assert_eq!(name, "Base 05");
    }

    #[test]
    fn random_round_follows_counter_round() {
        let name = synthesize("Base", plan(1, 0), |c| c.len() == "Base ".len() + 8).unwrap();
        let suffix = name.strip_prefix("Base ").unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn uuid_round_is_last() {
        let name = synthesize("Base", plan(1, 0), |c| c.len() == "Base ".len() + 32).unwrap();
        assert_eq!(name.len(), 37);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let err = synthesize("Base", plan(1, 0), |_| false).unwrap_err();
        assert_eq!(err, RegistryError::NameSynthesisExhausted { base: "Base".into() });
    }
}
