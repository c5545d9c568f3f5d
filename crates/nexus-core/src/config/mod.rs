//! Resolución determinista de configuración jerárquica.
//!
//! Capas, de menor a mayor precedencia: defaults del step < global < case <
//! overrides de línea de comandos. El merge es una función pura de sus
//! entradas: mismas capas, mismo resultado.

mod merge;

pub use merge::deep_merge;

use serde_json::Value;

use crate::errors::CoreError;
use crate::plugin::{ParamRole, StepSpec};

/// Una capa de configuración con nombre, inmutable una vez cargada.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub name: &'static str,
    pub values: Value,
}

impl ConfigLayer {
    pub fn new(name: &'static str, values: Value) -> Self {
        Self { name, values }
    }
}

/// Resultado del merge profundo de capas ordenadas.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub values: Value,
}

impl MergedConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Fold determinista sobre las capas en orden de precedencia declarado.
pub fn resolve(layers: &[ConfigLayer]) -> MergedConfig {
    let mut acc = Value::Object(serde_json::Map::new());
    for layer in layers {
        acc = deep_merge(&acc, &layer.values);
    }
    MergedConfig { values: acc }
}

/// Extrae del merge únicamente los parámetros planos del esquema del step,
/// validando presencia y tipo. Claves globales ajenas al esquema nunca se
/// filtran al objeto de config del step.
pub fn select_for_step(merged: &MergedConfig, spec: &StepSpec) -> Result<Value, CoreError> {
    let mut out = serde_json::Map::new();
    for p in &spec.params {
        if !matches!(p.role, ParamRole::Config) {
            continue;
        }
        let value = match merged.get(&p.name) {
            Some(v) => v.clone(),
            None => match &p.default {
                Some(d) => d.clone(),
                None => {
                    return Err(CoreError::Configuration(format!(
                        "step '{}': required parameter '{}' missing from every configuration layer",
                        spec.name, p.name
                    )))
                }
            },
        };
        if let Some(t) = p.value_type {
            if !t.matches(&value) {
                return Err(CoreError::Configuration(format!(
                    "step '{}': parameter '{}' expects {t}, got {value}",
                    spec.name, p.name
                )));
            }
        }
        out.insert(p.name.clone(), value);
    }
    Ok(Value::Object(out))
}
