//! Contexto compuesto entregado al callable de un step.

use std::path::Path;

use serde_json::Value;

use crate::exchange::DataExchange;

/// Rol "contexto completo": expone la config hidratada, el exchange de datos
/// y la ruta del case. Vive únicamente durante la invocación del step.
pub struct PluginContext<'run> {
    /// Config del step, hidratada y validada antes de la invocación.
    /// `Value::Null` para steps sin esquema de config.
    pub config: Value,
    /// Exchange del run: `get` por nombre lógico, memoizado.
    pub exchange: &'run mut DataExchange,
    /// Directorio del case en ejecución.
    pub case_path: &'run Path,
    /// Nombre del step en ejecución.
    pub step_name: &'run str,
}
