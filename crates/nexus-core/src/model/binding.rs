//! Binding: asociación resuelta de un nombre lógico con una ubicación física
//! y un handler. Se construye por run durante la fase de descubrimiento.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Descriptor de binding para un nombre lógico.
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    /// Ubicación física; si es relativa se resuelve contra el case.
    pub path: PathBuf,
    /// Handler explícito por nombre; `None` infiere por extensión.
    pub handler: Option<String>,
    /// Argumentos opacos entregados al handler en load/save.
    pub handler_args: Value,
    /// La ubicación debe existir antes del primer `get` (salvo handlers
    /// con creación bajo demanda).
    pub must_exist: bool,
}

impl BindingDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(),
               handler: None,
               handler_args: Value::Null,
               must_exist: true }
    }

    /// Ruta absoluta del binding, resolviendo relativas contra `case_path`.
    pub fn resolve_path(&self, case_path: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            case_path.join(&self.path)
        }
    }
}
