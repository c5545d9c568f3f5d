//! Esquema declarativo de parámetros de un step.
//!
//! El esquema se declara como datos en el momento del registro: cada
//! parámetro lleva un rol explícito en lugar de codificar la intención dentro
//! de anotaciones de tipo resueltas en runtime. La resolución de argumentos
//! es una búsqueda sobre esta tabla, nunca introspección.

use std::sync::Arc;

use serde_json::Value;

use crate::errors::CoreError;
use crate::model::{ParamType, ValueKind};
use crate::plugin::PluginCallable;

/// Rol de un parámetro dentro del conjunto cerrado de estrategias de
/// resolución. Exactamente una estrategia aplica por parámetro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRole {
    /// Parámetro plano de configuración, con default opcional. Sin default,
    /// el parámetro es requerido en alguna capa de configuración.
    Config,
    /// Marca que el step emite por el logger del run (span por step).
    Logger,
    /// El step recibe el contexto compuesto completo (config/data/logger).
    Context,
    /// Campo hidratado desde el exchange antes de construir la config.
    InputBinding { logical_name: String, expected: ValueKind },
    /// Destino de escritura del valor retornado; se resuelve al escribir.
    OutputBinding { logical_name: String },
}

/// Entrada del esquema de parámetros: (nombre, rol, default?, tipo?).
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub role: ParamRole,
    /// Default declarado por el step (capa de menor precedencia). Para un
    /// `InputBinding`, un objeto `{path, handler}` actúa como mapping de
    /// respaldo cuando el case no declara el nombre lógico.
    pub default: Option<Value>,
    /// Validación de tipo a nivel esquema para parámetros `Config`.
    pub value_type: Option<ParamType>,
}

impl ParamSpec {
    pub fn config(name: &str) -> Self {
        Self { name: name.to_string(),
               role: ParamRole::Config,
               default: None,
               value_type: None }
    }

    pub fn input(name: &str, logical_name: &str, expected: ValueKind) -> Self {
        Self { name: name.to_string(),
               role: ParamRole::InputBinding { logical_name: logical_name.to_string(), expected },
               default: None,
               value_type: None }
    }

    pub fn output(name: &str, logical_name: &str) -> Self {
        Self { name: name.to_string(),
               role: ParamRole::OutputBinding { logical_name: logical_name.to_string() },
               default: None,
               value_type: None }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn typed(mut self, value_type: ParamType) -> Self {
        self.value_type = Some(value_type);
        self
    }
}

/// Especificación completa de un step: nombre estable, esquema y callable.
/// Inmutable una vez registrada.
#[derive(Clone)]
pub struct StepSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub callable: Arc<dyn PluginCallable>,
}

impl StepSpec {
    pub fn new(name: &str, params: Vec<ParamSpec>, callable: Arc<dyn PluginCallable>) -> Self {
        Self { name: name.to_string(), params, callable }
    }

    /// Valida el esquema en el momento del registro: un parámetro
    /// irresoluble es un error de registro, nunca de runtime.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.is_empty() {
            return Err(CoreError::Registration("step name must not be empty".into()));
        }
        let mut seen: Vec<&str> = Vec::with_capacity(self.params.len());
        for p in &self.params {
            if p.name.is_empty() {
                return Err(CoreError::Registration(format!("step '{}': parameter with empty name", self.name)));
            }
            if seen.contains(&p.name.as_str()) {
                return Err(CoreError::Registration(format!("step '{}': duplicate parameter '{}'", self.name, p.name)));
            }
            seen.push(&p.name);
            match &p.role {
                ParamRole::InputBinding { logical_name, .. } | ParamRole::OutputBinding { logical_name } => {
                    if logical_name.is_empty() {
                        return Err(CoreError::Registration(format!(
                            "step '{}': parameter '{}' declares an empty logical name",
                            self.name, p.name
                        )));
                    }
                }
                ParamRole::Logger | ParamRole::Context => {
                    if p.default.is_some() || p.value_type.is_some() {
                        return Err(CoreError::Registration(format!(
                            "step '{}': parameter '{}' is role-injected and admits no default or type",
                            self.name, p.name
                        )));
                    }
                }
                ParamRole::Config => {}
            }
        }
        Ok(())
    }

    /// Defaults declarados por el esquema (capa de menor precedencia).
    pub fn default_params(&self) -> Value {
        let mut map = serde_json::Map::new();
        for p in &self.params {
            if matches!(p.role, ParamRole::Config) {
                if let Some(d) = &p.default {
                    map.insert(p.name.clone(), d.clone());
                }
            }
        }
        Value::Object(map)
    }

    /// Campos de entrada declarados: (campo, nombre lógico, tipo esperado).
    pub fn input_bindings(&self) -> impl Iterator<Item = (&str, &str, ValueKind)> {
        self.params.iter().filter_map(|p| match &p.role {
            ParamRole::InputBinding { logical_name, expected } => {
                Some((p.name.as_str(), logical_name.as_str(), *expected))
            }
            _ => None,
        })
    }

    /// Campos de salida declarados: (campo, nombre lógico).
    pub fn output_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().filter_map(|p| match &p.role {
            ParamRole::OutputBinding { logical_name } => Some((p.name.as_str(), logical_name.as_str())),
            _ => None,
        })
    }

    /// Un step sin campos de config ni entradas se ejecuta con config nula.
    pub fn has_config(&self) -> bool {
        self.params
            .iter()
            .any(|p| matches!(p.role, ParamRole::Config | ParamRole::InputBinding { .. }))
    }
}

impl std::fmt::Debug for StepSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepSpec")
         .field("name", &self.name)
         .field("params", &self.params)
         .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginContext;

    #[derive(Debug)]
    struct Noop;
    impl PluginCallable for Noop {
        fn call(&self, _ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
            Ok(None)
        }
    }

    #[test]
    fn duplicate_parameter_is_a_registration_error() {
        let spec = StepSpec::new("s",
                                 vec![ParamSpec::config("factor"), ParamSpec::config("factor")],
                                 Arc::new(Noop));
        assert!(matches!(spec.validate(), Err(CoreError::Registration(_))));
    }

    #[test]
    fn role_injected_parameter_admits_no_default() {
        let mut p = ParamSpec::config("log");
        p.role = ParamRole::Logger;
        let spec = StepSpec::new("s", vec![p.with_default(Value::Bool(true))], Arc::new(Noop));
        assert!(matches!(spec.validate(), Err(CoreError::Registration(_))));
    }

    #[test]
    fn default_params_cover_only_plain_config_fields() {
        let spec = StepSpec::new("s",
                                 vec![ParamSpec::config("factor").with_default(Value::from(2)),
                                      ParamSpec::input("events", "events", ValueKind::Table)],
                                 Arc::new(Noop));
        let d = spec.default_params();
        assert_eq!(d["factor"], 2);
        assert!(d.get("events").is_none());
    }
}
