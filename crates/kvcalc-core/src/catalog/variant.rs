//! Model variant record and its mixture-of-experts invariant.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Experts invoked per token when a variant does not say otherwise.
pub const DEFAULT_ACTIVE_EXPERTS: u64 = 2;

/// One size/configuration of a model family.
///
/// A variant is mixture-of-experts when `num_experts` is set; such a variant
/// must also carry `expert_capacity`. Dense variants leave both unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVariant {
    /// Identifier, unique within the parent model
    pub name: String,
    /// Number of transformer blocks
    pub num_layers: u64,
    /// Embedding/model dimension
    pub hidden_size: u64,
    /// Attention heads per layer
    pub num_attention_heads: u64,
    /// Experts per MoE layer (absent for dense variants)
    #[serde(default)]
    pub num_experts: Option<u64>,
    /// Per-expert token capacity (required iff `num_experts` is set)
    #[serde(default)]
    pub expert_capacity: Option<u64>,
    /// Experts invoked per token; see [`ModelVariant::active_experts`]
    #[serde(default)]
    pub active_experts: Option<u64>,
}

impl ModelVariant {
    /// Create a dense variant.
    pub fn dense(
        name: impl Into<String>,
        num_layers: u64,
        hidden_size: u64,
        num_attention_heads: u64,
    ) -> Self {
        Self {
            name: name.into(),
            num_layers,
            hidden_size,
            num_attention_heads,
            num_experts: None,
            expert_capacity: None,
            active_experts: None,
        }
    }

    /// Turn this variant into a mixture-of-experts variant.
    pub fn with_experts(mut self, num_experts: u64, expert_capacity: u64) -> Self {
        self.num_experts = Some(num_experts);
        self.expert_capacity = Some(expert_capacity);
        self
    }

    pub fn with_active_experts(mut self, active_experts: u64) -> Self {
        self.active_experts = Some(active_experts);
        self
    }

    /// Experts invoked per token, [`DEFAULT_ACTIVE_EXPERTS`] when unset.
    pub fn active_experts(&self) -> u64 {
        self.active_experts.unwrap_or(DEFAULT_ACTIVE_EXPERTS)
    }

    pub fn is_moe(&self) -> bool {
        self.num_experts.is_some()
    }

    /// Check the fields an MoE model requires of each of its variants.
    pub(crate) fn validate_moe(&self, model: &str) -> Result<()> {
        if self.num_experts.is_none() {
            return Err(Error::config(
                model,
                &self.name,
                "MoE model variant is missing the 'num_experts' parameter",
            ));
        }
        if self.expert_capacity.is_none() {
            return Err(Error::config(
                model,
                &self.name,
                "MoE model variant is missing the 'expert_capacity' parameter",
            ));
        }
        Ok(())
    }
}
