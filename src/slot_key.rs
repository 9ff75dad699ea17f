//! Slot key normalization, role inference and resolution
//!
//! Kit-type authors label slots inconsistently ("Drone 1", "avetta_drone",
//! "Drone" all mean the same slot of an "Avetta" kit). This module derives
//! one stable, kit-type-scoped identifier from whatever was authored:
//!
//! 1. [`normalize`] / [`canonicalize`]: pure string cleanup
//! 2. [`infer_role`]: classify the slot's required role from its key/label
//! 3. [`resolve_slot_key`]: combine role + kit type into the canonical key

use crate::config::RoleRuleTable;
use serde::{Deserialize, Serialize};

/// Lowercase, trim, and collapse runs of whitespace/hyphens/underscores to
/// a single underscore.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`. Empty input
/// yields an empty string, never an error.
pub fn normalize(key: &str) -> String {
    let trimmed = key.trim().to_lowercase();
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_sep = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
        } else {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        }
    }
    out
}

/// [`normalize`] and additionally strip underscores/hyphens entirely.
///
/// Used only for equality comparison, never for display or storage:
/// "Remote Control" and "remote_control" canonicalize identically.
pub fn canonicalize(key: &str) -> String {
    normalize(key).chars().filter(|c| *c != '_').collect()
}

/// Semantic role a slot can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    Goggles,
    RemoteControl,
    BombDropper,
    Drone,
}

impl SlotRole {
    /// Canonical role name as embedded in resolved slot keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotRole::Goggles => "goggles",
            SlotRole::RemoteControl => "remote_control",
            SlotRole::BombDropper => "bomb_dropper",
            SlotRole::Drone => "drone",
        }
    }
}

impl std::fmt::Display for SlotRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Infer the required role of a slot from its key and display label.
///
/// Both inputs are canonicalized, then tested against the rule table in
/// order; the first rule with a keyword contained in either wins (keyword
/// sets overlap, so order is significant). If no rule matches but the
/// canonical key equals the canonical kit-type name, the slot is taken to
/// be the kit's primary/self-named slot and defaults to [`SlotRole::Drone`].
///
/// Returns `None` when nothing matches; callers must fall back to the raw
/// normalized key rather than failing.
pub fn infer_role(
    slot_key: &str,
    slot_label: &str,
    kit_type: &str,
    rules: &RoleRuleTable,
) -> Option<SlotRole> {
    let key = canonicalize(slot_key);
    let label = canonicalize(slot_label);

    for rule in &rules.rules {
        for keyword in &rule.keywords {
            // Keywords are compared canonicalized so table entries may be
            // written either as "remotecontrol" or "remote_control".
            let kw = canonicalize(keyword);
            if kw.is_empty() {
                continue;
            }
            if key.contains(&kw) || label.contains(&kw) {
                return Some(rule.role);
            }
        }
    }

    let kit = canonicalize(kit_type);
    if !kit.is_empty() && key == kit {
        return Some(SlotRole::Drone);
    }
    None
}

/// Resolve a slot key to its canonical, kit-type-scoped form.
///
/// - No role inferred: the normalized key (the raw key if normalization
///   yields empty).
/// - Role inferred but kit type normalizes to empty: the role name alone.
/// - Otherwise: `"{normalized_kit_type}_{role}"`.
///
/// # Examples
///
/// ```
/// use armory_core::slot_key::resolve_slot_key;
/// use armory_core::config::default_config;
///
/// let rules = &default_config().roles;
/// assert_eq!(resolve_slot_key("Drone 1", "Avetta", "", rules), "avetta_drone");
/// assert_eq!(resolve_slot_key("avetta_drone", "Avetta", "", rules), "avetta_drone");
/// assert_eq!(resolve_slot_key("Battery Bay", "Avetta", "", rules), "battery_bay");
/// ```
pub fn resolve_slot_key(
    slot_key: &str,
    kit_type: &str,
    slot_label: &str,
    rules: &RoleRuleTable,
) -> String {
    match infer_role(slot_key, slot_label, kit_type, rules) {
        None => {
            let normalized = normalize(slot_key);
            if normalized.is_empty() {
                slot_key.to_string()
            } else {
                normalized
            }
        }
        Some(role) => {
            let kit = normalize(kit_type);
            if kit.is_empty() {
                role.as_str().to_string()
            } else {
                format!("{}_{}", kit, role.as_str())
            }
        }
    }
}
