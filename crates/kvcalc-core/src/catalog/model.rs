//! Model definitions: a named family with an ordered list of variants.

use serde::{Deserialize, Serialize};

use super::variant::ModelVariant;
use crate::error::Result;

/// Unvalidated model entry as it appears in a catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variants: Vec<ModelVariant>,
}

/// Validated model family.
///
/// Variants keep their catalog order. If any variant sets `num_experts` the
/// whole definition is treated as mixture-of-experts and every variant must
/// carry the MoE fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDefinition {
    name: String,
    description: String,
    variants: Vec<ModelVariant>,
}

impl ModelDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        variants: Vec<ModelVariant>,
    ) -> Result<Self> {
        let name = name.into();

        if variants.iter().any(ModelVariant::is_moe) {
            for variant in &variants {
                variant.validate_moe(&name)?;
            }
        }

        Ok(Self {
            name,
            description: description.into(),
            variants,
        })
    }

    pub fn from_record(record: ModelRecord) -> Result<Self> {
        Self::new(record.name, record.description, record.variants)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn variants(&self) -> &[ModelVariant] {
        &self.variants
    }

    /// Whether this definition was classified as mixture-of-experts
    pub fn is_moe(&self) -> bool {
        self.variants.iter().any(ModelVariant::is_moe)
    }

    /// Find a variant by exact name; the first match wins.
    pub fn variant(&self, name: &str) -> Option<&ModelVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}
