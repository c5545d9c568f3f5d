//! Steps ("plugins"): especificación declarativa y contrato de ejecución.

pub mod context;
pub mod spec;

pub use context::PluginContext;
pub use spec::{ParamRole, ParamSpec, StepSpec};

use serde_json::Value;

use crate::errors::CoreError;

/// Unidad de lógica de procesamiento. Implementaciones retornan el valor
/// producido (`Some`) o `None` cuando escriben directamente o no producen.
pub trait PluginCallable: Send + Sync + std::fmt::Debug {
    fn call(&self, ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError>;
}
