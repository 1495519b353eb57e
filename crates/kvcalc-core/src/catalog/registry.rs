//! In-memory registry of model definitions.

use indexmap::map::Values;
use indexmap::IndexMap;
use tracing::debug;

use super::model::{ModelDefinition, ModelRecord};
use super::variant::ModelVariant;
use crate::error::{Error, Result};

/// Mapping from model name to definition, kept in registration order.
///
/// Built once from a catalog source and optionally extended with [`merge`].
/// Entries are never removed.
///
/// [`merge`]: ModelRegistry::merge
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelDefinition>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an ordered sequence of model records.
    ///
    /// Later records with the same name replace earlier ones.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = ModelRecord>,
    {
        let mut registry = Self::new();
        registry.merge(records)?;
        Ok(registry)
    }

    /// Add definitions from another source, overwriting same-named entries.
    ///
    /// Every record is validated before the registry is touched, so a failed
    /// merge leaves the existing entries unchanged.
    pub fn merge<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = ModelRecord>,
    {
        let definitions = records
            .into_iter()
            .map(ModelDefinition::from_record)
            .collect::<Result<Vec<_>>>()?;

        for definition in definitions {
            self.insert(definition);
        }
        Ok(())
    }

    /// Register a single definition, replacing any entry with the same name.
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, definition: ModelDefinition) {
        debug!(
            "Registering model {} ({} variants, moe={})",
            definition.name(),
            definition.variants().len(),
            definition.is_moe()
        );
        let name = definition.name().to_string();
        if self.models.insert(name, definition).is_some() {
            debug!("Replaced earlier definition of the same name");
        }
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }

    /// All definitions in registration order
    pub fn list(&self) -> Values<'_, String, ModelDefinition> {
        self.models.values()
    }

    /// Resolve a (model, variant) pair, failing if either is unknown.
    pub fn variant(&self, model: &str, variant: &str) -> Result<&ModelVariant> {
        let definition = self
            .get(model)
            .ok_or_else(|| Error::ModelNotFound(model.to_string()))?;
        definition
            .variant(variant)
            .ok_or_else(|| Error::VariantNotFound {
                model: model.to_string(),
                variant: variant.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
