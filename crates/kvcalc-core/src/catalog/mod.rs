//! Model catalog: variant records, model definitions, and the registry.
//!
//! Definitions are validated once when they enter the registry; the
//! calculator only ever sees the fields of a single variant.

mod model;
mod registry;
mod variant;

pub use model::{ModelDefinition, ModelRecord};
pub use registry::ModelRegistry;
pub use variant::{ModelVariant, DEFAULT_ACTIVE_EXPERTS};
