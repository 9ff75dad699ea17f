//! # Armory Core Library
//!
//! Equipment-slot resolution and assignment-constraint engine shared by
//! the armory inventory services:
//! - Slot key normalization, role inference and canonical resolution
//! - Component/slot compatibility matching
//! - Kit slot-map normalization and migration
//! - Per-slot availability filtering for kit editing
//! - Linked weapon pair discovery and duplicate-type batch validation
//! - Quantity-conserving stock allocation plans
//! - Assignment planning from a signing selection to a write batch
//! - Outbound write contract with settle-all batch execution
//!
//! Everything up to the write contract is pure and synchronous; the store
//! itself is an external collaborator behind [`store::EquipmentStore`].

pub mod assign;
pub mod availability;
pub mod batch;
pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod pairing;
pub mod slot_key;
pub mod slot_map;
pub mod stock;
pub mod store;

pub use config::{default_config, EngineConfig};
pub use error::{Error, Result};
