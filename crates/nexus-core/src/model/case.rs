//! Documentos de configuración externos: `case.yaml` y `global.yaml`.
//!
//! Un case es una corrida concreta: la sección `io_mapping` liga nombres
//! lógicos a {ruta, handler, existencia, args} y la sección `pipeline` lista
//! los steps habilitados en orden con sus overrides.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::CoreError;

fn default_true() -> bool {
    true
}

fn default_params() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Entrada de la sección `io_mapping` del case.
#[derive(Debug, Clone, Deserialize)]
pub struct IoMappingEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub handler_args: Value,
    #[serde(default = "default_true")]
    pub must_exist: bool,
}

/// Un paso del pipeline declarado en el case.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineStep {
    pub plugin: String,
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_params")]
    pub params: Value,
}

/// Configuración de un case (una corrida).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseConfig {
    #[serde(default)]
    pub io_mapping: IndexMap<String, IoMappingEntry>,
    #[serde(default)]
    pub pipeline: Vec<PipelineStep>,
    /// Overrides de parámetros a nivel case, aplicados a todos los steps.
    #[serde(default = "default_params")]
    pub params: Value,
}

impl CaseConfig {
    /// Carga `case.yaml` desde el directorio del case.
    pub fn load(case_path: &Path) -> Result<Self, CoreError> {
        let file = case_path.join("case.yaml");
        let raw = std::fs::read_to_string(&file).map_err(|e| CoreError::Io { path: file.clone(), source: e })?;
        serde_yaml::from_str(&raw)
            .map_err(|e| CoreError::Configuration(format!("malformed case document {}: {e}", file.display())))
    }
}

/// Configuración global del proyecto (`global.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    /// Directorio base de los cases.
    #[serde(default = "GlobalConfig::default_cases_root")]
    pub cases_root: PathBuf,
    /// Política del chequeo de tipos pre-vuelo: `true` aborta el run ante
    /// cualquier hallazgo; `false` los degrada a warnings.
    #[serde(default)]
    pub strict_type_check: bool,
    /// Overrides de parámetros aplicados a todos los cases.
    #[serde(default = "default_params")]
    pub defaults: Value,
}

impl GlobalConfig {
    fn default_cases_root() -> PathBuf {
        PathBuf::from("cases")
    }

    pub fn load(file: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(file).map_err(|e| CoreError::Io { path: file.to_path_buf(), source: e })?;
        serde_yaml::from_str(&raw)
            .map_err(|e| CoreError::Configuration(format!("malformed global document {}: {e}", file.display())))
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self { cases_root: Self::default_cases_root(),
               strict_type_check: false,
               defaults: default_params() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_yaml_defaults_enable_and_must_exist() {
        let doc = r#"
io_mapping:
  events:
    path: in.csv
    handler: csv
pipeline:
  - plugin: double_value
    params: { factor: 2 }
"#;
        let case: CaseConfig = serde_yaml::from_str(doc).expect("case parses");
        assert!(case.io_mapping["events"].must_exist);
        assert!(case.pipeline[0].enable);
        assert_eq!(case.pipeline[0].params["factor"], 2);
    }

    #[test]
    fn global_yaml_policy_defaults_to_permissive() {
        let g: GlobalConfig = serde_yaml::from_str("cases_root: work/cases").expect("global parses");
        assert!(!g.strict_type_check);
        assert_eq!(g.cases_root, PathBuf::from("work/cases"));
    }
}
