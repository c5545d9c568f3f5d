//! Tipos de valor neutrales intercambiados entre steps y handlers.
//!
//! El runtime no interpreta la semántica de los datos: todo valor viaja como
//! `serde_json::Value`. `ValueKind` es el contrato de tipo producido que un
//! handler declara y contra el que se valida la entrada declarada de un step.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contrato de tipo producido por un handler / esperado por un step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Secuencia ordenada de filas (array JSON de objetos).
    Table,
    /// JSON genérico sin forma declarada.
    Json,
    /// Texto plano.
    Text,
    /// Directorio en disco (el valor es su ruta).
    Directory,
}

impl ValueKind {
    /// Compatibilidad declarada: igualdad exacta, o `Json` como supertipo
    /// que acepta cualquier contrato producido.
    pub fn accepts(self, produced: ValueKind) -> bool {
        self == produced || self == ValueKind::Json
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Table => "table",
            ValueKind::Json => "json",
            ValueKind::Text => "text",
            ValueKind::Directory => "directory",
        };
        f.write_str(s)
    }
}

/// Tipo escalar declarable para parámetros planos de configuración.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Bool,
    Array,
    Object,
}

impl ParamType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Bool => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Bool => "bool",
            ParamType::Array => "array",
            ParamType::Object => "object",
        };
        f.write_str(s)
    }
}
