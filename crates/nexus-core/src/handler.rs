//! Contrato de handlers de datos.
//!
//! Un handler implementa load/save para una representación concreta y declara
//! su contrato de tipo producido. Los recursos físicos se adquieren y liberan
//! dentro de una sola llamada.

use std::path::Path;

use serde_json::Value;

use crate::errors::CoreError;
use crate::model::ValueKind;

pub trait DataHandler: Send + Sync {
    /// Nombre estable del handler (referenciable desde `io_mapping`).
    fn name(&self) -> &str;

    /// Extensiones de archivo que este handler reclama (con punto, p.ej. ".csv").
    fn extensions(&self) -> &[&str] {
        &[]
    }

    /// Contrato de tipo que `load` promete producir.
    fn produced_kind(&self) -> ValueKind;

    /// Handlers de directorio crean su destino bajo demanda; para ellos la
    /// verificación de existencia previa no aplica.
    fn handles_directories(&self) -> bool {
        false
    }

    /// Carga el valor desde la ubicación física. Debe fallar ante una
    /// ubicación ilegible.
    fn load(&self, path: &Path, args: &Value) -> Result<Value, CoreError>;

    /// Persiste el valor en la ubicación física, sobreescribiendo.
    fn save(&self, value: &Value, path: &Path, args: &Value) -> Result<(), CoreError>;
}
