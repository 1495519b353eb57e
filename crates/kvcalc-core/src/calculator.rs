//! KV-cache size estimation.
//!
//! For each layer the cache holds one Key and one Value tensor, so the
//! per-layer footprint is
//!
//! ```text
//! hidden_size * sequence_length * 2 * num_attention_heads * (precision_bits / 8)
//! ```
//!
//! `hidden_size` and `num_attention_heads` are used as independent factors.
//! Mixture-of-experts variants scale the per-layer size by the number of
//! experts active per token; `expert_capacity` does not enter the formula.
//! The total is the per-layer size times `num_layers` times `batch_size`.

use serde::{Deserialize, Serialize};

use crate::catalog::{ModelDefinition, ModelVariant};
use crate::error::{Error, Result};

pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
pub const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / BYTES_PER_GIB
}

pub fn bytes_to_mib(bytes: f64) -> f64 {
    bytes / BYTES_PER_MIB
}

/// Numeric precision of the cached tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Float16,
    Float32,
}

impl Precision {
    /// Parse a bit width (16 or 32)
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            16 => Ok(Self::Float16),
            32 => Ok(Self::Float32),
            other => Err(Error::invalid_parameter(format!(
                "precision_bits must be 16 or 32, got {other}"
            ))),
        }
    }

    /// Parse a per-element byte size (2 or 4)
    pub fn from_bytes(bytes: u32) -> Result<Self> {
        match bytes {
            2 => Ok(Self::Float16),
            4 => Ok(Self::Float32),
            other => Err(Error::invalid_parameter(format!(
                "precision must be 2 (float16) or 4 (float32), got {other}"
            ))),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::Float16 => 16,
            Self::Float32 => 32,
        }
    }

    pub fn bytes(self) -> u32 {
        self.bits() / 8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Float16 => "float16",
            Self::Float32 => "float32",
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Runtime parameters for one estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheParams {
    /// Tokens held in the cache per sequence
    #[serde(default = "default_sequence_length")]
    pub sequence_length: u64,

    /// Sequences decoded in parallel
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Bits per cached element (16 or 32)
    #[serde(default = "default_precision_bits")]
    pub precision_bits: u32,
}

fn default_sequence_length() -> u64 {
    2048
}

fn default_batch_size() -> u64 {
    1
}

fn default_precision_bits() -> u32 {
    16
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            sequence_length: default_sequence_length(),
            batch_size: default_batch_size(),
            precision_bits: default_precision_bits(),
        }
    }
}

impl CacheParams {
    pub fn with_sequence_length(mut self, sequence_length: u64) -> Self {
        self.sequence_length = sequence_length;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision_bits = precision.bits();
        self
    }

    pub fn with_precision_bits(mut self, precision_bits: u32) -> Self {
        self.precision_bits = precision_bits;
        self
    }

    /// Check every precondition and return the parsed precision.
    pub fn validate(&self) -> Result<Precision> {
        let precision = Precision::from_bits(self.precision_bits)?;
        if self.sequence_length == 0 {
            return Err(Error::invalid_parameter(
                "sequence_length must be a positive integer",
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::invalid_parameter(
                "batch_size must be a positive integer",
            ));
        }
        Ok(precision)
    }
}

/// Estimate the KV-cache size of `variant` in bytes.
///
/// Parameters are validated before any arithmetic. The variant's own fields
/// are not checked here; a zero layer or head count yields zero.
pub fn calculate(variant: &ModelVariant, params: &CacheParams) -> Result<f64> {
    let precision = params.validate()?;

    let bytes_per_element = f64::from(precision.bits()) / 8.0;
    // Factor order is part of the result; reordering changes rounding.
    let mut size_per_layer = variant.hidden_size as f64
        * params.sequence_length as f64
        * 2.0
        * variant.num_attention_heads as f64
        * bytes_per_element;

    if matches!(variant.num_experts, Some(n) if n != 0) {
        size_per_layer *= variant.active_experts() as f64;
    }

    Ok(size_per_layer * variant.num_layers as f64 * params.batch_size as f64)
}

/// Look up `variant_name` in `model` and estimate its cache size in bytes.
pub fn calculate_for_named_variant(
    model: &ModelDefinition,
    variant_name: &str,
    params: &CacheParams,
) -> Result<f64> {
    let variant = model
        .variant(variant_name)
        .ok_or_else(|| Error::VariantNotFound {
            model: model.name().to_string(),
            variant: variant_name.to_string(),
        })?;
    calculate(variant, params)
}
