//! Configuration loading and management for the entitlement engine.
//!
//! This module loads `engine.yaml`: the ids of the collaborator
//! collections, the meal subsidy rate, cash-out fallbacks, the read cache
//! lifetime and the HTTP bind address.
//!
//! # Example
//!
//! ```no_run
//! use entitlement_engine::config::{Collection, ConfigLoader};
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! println!("Payroll collection: {:?}", loader.collections().get(Collection::Payroll));
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE, ConfigLoader};
pub use types::{
    CacheConfig, CashoutDefaults, Collection, CollectionIds, EngineConfig, LunchConfig,
    ServerConfig,
};
