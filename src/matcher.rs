//! Component/slot compatibility matching
//!
//! [`component_matches`] is the single source of truth for "can component X
//! fill a slot requiring type Y under kit type Z". Both the slot-map
//! normalizer and the availability filter must call it; nothing else may
//! reimplement these rules.

use crate::config::FamilyConfig;

/// Decide whether a component satisfies a required-type string for a kit.
///
/// All three inputs are lowercased before comparison. Rules are selected by
/// required-type content, in order:
///
/// - mentions "goggles": the component must mention "goggles". When the kit
///   belongs to one of the mutually exclusive families, a component naming a
///   *different* family is rejected unless it also names the current one;
///   generic goggles (naming no family) are accepted.
/// - mentions "remote": the component must mention "remote".
/// - mentions "bomb dropper": the component must mention "bomb dropper" and
///   the family those are produced for.
/// - mentions "drone": the component must mention "drone", and the kit type
///   too when one is given.
/// - anything else: the component must mention the kit type when one is
///   given, else always matches.
pub fn component_matches(
    component_type: &str,
    required_type: &str,
    kit_type: &str,
    families: &FamilyConfig,
) -> bool {
    let component = component_type.to_lowercase();
    let required = required_type.to_lowercase();
    let kit = kit_type.to_lowercase();

    if required.contains("goggles") {
        if !component.contains("goggles") {
            return false;
        }
        if !kit.is_empty() {
            if let Some(current) = families.family_of(&kit) {
                let names_other_family = families
                    .exclusive
                    .iter()
                    .any(|f| f != current && component.contains(f.as_str()));
                if names_other_family && !component.contains(current) {
                    return false;
                }
            }
        }
        true
    } else if required.contains("remote") {
        component.contains("remote")
    } else if required.contains("bomb dropper") {
        component.contains("bomb dropper")
            && component.contains(families.bomb_dropper_family.as_str())
    } else if required.contains("drone") {
        component.contains("drone") && (kit.is_empty() || component.contains(&kit))
    } else {
        kit.is_empty() || component.contains(&kit)
    }
}
