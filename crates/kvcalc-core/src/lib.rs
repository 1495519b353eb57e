//! kvcalc core - KV-cache memory estimation for transformer models
//!
//! This crate sizes the key/value attention cache of a model variant for a
//! given sequence length, batch size, and numeric precision.
//!
//! # Architecture
//!
//! - [`catalog`] holds the data model: variants (dense or mixture-of-experts),
//!   model definitions, and the [`ModelRegistry`]
//! - [`config`] parses YAML catalogs and ships the built-in one
//! - [`calculator`] is the pure size formula
//!
//! # Example
//!
//! ```no_run
//! use kvcalc_core::{calculate, bytes_to_gib, CacheParams, CatalogConfig};
//!
//! let registry = CatalogConfig::builtin()?.into_registry()?;
//! let variant = registry.variant("LLaMA", "7B")?;
//! let params = CacheParams::default().with_sequence_length(4096);
//! println!("{:.2} GB", bytes_to_gib(calculate(variant, &params)?));
//! # Ok::<(), kvcalc_core::Error>(())
//! ```

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;

pub use calculator::{
    bytes_to_gib, bytes_to_mib, calculate, calculate_for_named_variant, CacheParams, Precision,
    BYTES_PER_GIB, BYTES_PER_MIB,
};
pub use catalog::{
    ModelDefinition, ModelRecord, ModelRegistry, ModelVariant, DEFAULT_ACTIVE_EXPERTS,
};
pub use config::{default_config_path, load_registry, CatalogConfig, MODELS_CONFIG_ENV};
pub use error::{Error, Result};
