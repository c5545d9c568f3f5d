//! nexus-plugins: steps incorporados del runtime.
//!
//! Cada módulo expone su `StepSpec` mediante una función `spec()`; el
//! registro completo es un alcance de descubrimiento sobre el
//! `CapabilityRegistry`.

pub mod double_value;
pub mod initial_data_reader;
pub mod quality_check;

use nexus_core::{CapabilityRegistry, CoreError};

/// Registra los steps incorporados. Idempotente por alcance.
pub fn register_builtins(registry: &mut CapabilityRegistry) -> Result<(), CoreError> {
    registry.discover("builtin-plugins", |r| {
                r.register_step(initial_data_reader::spec())?;
                r.register_step(double_value::spec())?;
                r.register_step(quality_check::spec())?;
                Ok(())
            })
}
