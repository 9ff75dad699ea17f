//! Engine configuration: rule tables as data, not code
//!
//! The role keyword table, the mutually-exclusive kit families and the
//! weapon pairing marker are deployment data so a new kit family can be
//! introduced without touching matcher logic. Everything here is serde
//! round-trippable; [`default_config`] provides the built-in tables.

use crate::error::{Error, Result};
use crate::slot_key::SlotRole;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One ordered classification rule: if any keyword is contained in a slot's
/// canonicalized key or label, the slot has `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub keywords: Vec<String>,
    pub role: SlotRole,
}

/// Ordered role classification table.
///
/// Evaluation is order-sensitive because keyword sets overlap (e.g.
/// "remote" would also hit inside "remote control"); earlier rules win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRuleTable {
    /// Bumped whenever the built-in rule set changes shape
    pub version: u32,
    pub rules: Vec<RoleRule>,
}

impl Default for RoleRuleTable {
    fn default() -> Self {
        RoleRuleTable {
            version: 1,
            rules: vec![
                RoleRule {
                    keywords: vec!["goggles".into()],
                    role: SlotRole::Goggles,
                },
                RoleRule {
                    keywords: vec!["remotecontrol".into(), "remote".into(), "controller".into()],
                    role: SlotRole::RemoteControl,
                },
                RoleRule {
                    keywords: vec!["bombdropper".into(), "dropper".into()],
                    role: SlotRole::BombDropper,
                },
                RoleRule {
                    keywords: vec!["drone".into()],
                    role: SlotRole::Drone,
                },
            ],
        }
    }
}

/// Kit families whose goggles are mutually exclusive.
///
/// The legacy data encodes exactly two families that cross-reference each
/// other by name in component type strings; keeping the list here (rather
/// than inline literals) lets a third family be added as configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Lowercase family markers, e.g. ["avetta", "evo"]
    pub exclusive: Vec<String>,
    /// The one family that bomb-dropper components are produced for
    pub bomb_dropper_family: String,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        FamilyConfig {
            exclusive: vec!["avetta".into(), "evo".into()],
            bomb_dropper_family: "evo".into(),
        }
    }
}

impl FamilyConfig {
    /// The family a kit type belongs to, if any (substring match on the
    /// lowercased kit type name)
    pub fn family_of<'a>(&'a self, kit_type_lower: &str) -> Option<&'a str> {
        self.exclusive
            .iter()
            .find(|f| kit_type_lower.contains(f.as_str()))
            .map(String::as_str)
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub roles: RoleRuleTable,
    pub families: FamilyConfig,
    /// Substring of `item_type` marking weapons that come in linked twos
    pub pairing_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            roles: RoleRuleTable::default(),
            families: FamilyConfig::default(),
            pairing_marker: "קנס\"פ".into(),
        }
    }
}

impl EngineConfig {
    /// Validate a loaded configuration before use.
    ///
    /// Rejects empty rule tables, rules without keywords, blank family
    /// names and a blank pairing marker. Called by deployments that load
    /// the config from JSON instead of using the built-ins.
    pub fn validate(&self) -> Result<()> {
        if self.roles.rules.is_empty() {
            return Err(Error::Config("role rule table is empty".into()));
        }
        for (i, rule) in self.roles.rules.iter().enumerate() {
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "role rule {} ({}) has no usable keywords",
                    i, rule.role
                )));
            }
        }
        if self.families.exclusive.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::Config("blank family name in exclusive list".into()));
        }
        if self.pairing_marker.trim().is_empty() {
            return Err(Error::Config("pairing marker is blank".into()));
        }
        Ok(())
    }
}

static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

/// The built-in engine configuration
pub fn default_config() -> &'static EngineConfig {
    &DEFAULT_CONFIG
}
