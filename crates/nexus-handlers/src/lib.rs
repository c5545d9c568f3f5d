//! nexus-handlers: handlers de datos incorporados (csv, json, text,
//! directory). Se registran como un alcance de descubrimiento del
//! `CapabilityRegistry`.

pub mod csv;
pub mod directory;
pub mod json;
pub mod text;

use std::sync::Arc;

use nexus_core::{CapabilityRegistry, CoreError};

pub use crate::csv::CsvHandler;
pub use crate::directory::DirectoryHandler;
pub use crate::json::JsonHandler;
pub use crate::text::TextHandler;

/// Registra los handlers incorporados. Idempotente por alcance.
pub fn register_builtins(registry: &mut CapabilityRegistry) -> Result<(), CoreError> {
    registry.discover("builtin-handlers", |r| {
                r.register_handler(Arc::new(CsvHandler))?;
                r.register_handler(Arc::new(JsonHandler))?;
                r.register_handler(Arc::new(TextHandler))?;
                r.register_handler(Arc::new(DirectoryHandler))?;
                Ok(())
            })
}
