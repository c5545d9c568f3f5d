//! Catálogo write-once de capacidades: steps y handlers.
//!
//! Reemplaza registros globales mutables por un objeto explícito: se puebla
//! una vez mediante pases de descubrimiento, se congela, y se comparte por
//! referencia de sólo lectura durante los runs.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::CoreError;
use crate::handler::DataHandler;
use crate::plugin::StepSpec;

#[derive(Default)]
pub struct CapabilityRegistry {
    steps: IndexMap<String, StepSpec>,
    handlers: Vec<Arc<dyn DataHandler>>,
    /// Alcances de descubrimiento ya completados (idempotencia).
    scopes: HashSet<String>,
    frozen: bool,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.frozen {
            return Err(CoreError::Registration("registry is frozen; registration is closed".into()));
        }
        Ok(())
    }

    /// Registra un step. Duplicar un nombre es un error de configuración del
    /// proceso, no una re-registración silenciosa.
    pub fn register_step(&mut self, spec: StepSpec) -> Result<(), CoreError> {
        self.ensure_open()?;
        spec.validate()?;
        if self.steps.contains_key(&spec.name) {
            return Err(CoreError::Registration(format!("step '{}' is already registered", spec.name)));
        }
        self.steps.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn register_handler(&mut self, handler: Arc<dyn DataHandler>) -> Result<(), CoreError> {
        self.ensure_open()?;
        let name = handler.name().to_string();
        if name.is_empty() {
            return Err(CoreError::Registration("handler name must not be empty".into()));
        }
        if self.handlers.iter().any(|h| h.name() == name) {
            return Err(CoreError::Registration(format!("handler '{name}' is already registered")));
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Ejecuta un pase de descubrimiento una sola vez por alcance. Repetir el
    /// mismo alcance es un no-op, nunca un error de nombre duplicado.
    pub fn discover(&mut self,
                    scope: &str,
                    register: impl FnOnce(&mut Self) -> Result<(), CoreError>)
                    -> Result<(), CoreError> {
        if self.scopes.contains(scope) {
            return Ok(());
        }
        register(self)?;
        self.scopes.insert(scope.to_string());
        Ok(())
    }

    /// Cierra el registro para el resto de la vida del proceso.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn lookup_step(&self, name: &str) -> Option<&StepSpec> {
        self.steps.get(name)
    }

    /// Busca handler por nombre; si no hay, por extensión reclamada.
    pub fn lookup_handler(&self, name_or_extension: &str) -> Option<Arc<dyn DataHandler>> {
        if let Some(h) = self.handlers.iter().find(|h| h.name() == name_or_extension) {
            return Some(Arc::clone(h));
        }
        self.handlers
            .iter()
            .find(|h| h.extensions().contains(&name_or_extension))
            .map(Arc::clone)
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(|s| s.as_str())
    }

    pub fn handlers(&self) -> &[Arc<dyn DataHandler>] {
        &self.handlers
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
         .field("steps", &self.steps.keys().collect::<Vec<_>>())
         .field("handlers", &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>())
         .field("frozen", &self.frozen)
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueKind;
    use crate::plugin::{PluginCallable, PluginContext};
    use serde_json::Value;
    use std::path::Path;

    #[derive(Debug)]
    struct Noop;
    impl PluginCallable for Noop {
        fn call(&self, _ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
            Ok(None)
        }
    }

    struct FakeHandler(&'static str, &'static [&'static str]);
    impl DataHandler for FakeHandler {
        fn name(&self) -> &str {
            self.0
        }
        fn extensions(&self) -> &[&str] {
            self.1
        }
        fn produced_kind(&self) -> ValueKind {
            ValueKind::Json
        }
        fn load(&self, _path: &Path, _args: &Value) -> Result<Value, CoreError> {
            Ok(Value::Null)
        }
        fn save(&self, _value: &Value, _path: &Path, _args: &Value) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn step(name: &str) -> StepSpec {
        StepSpec::new(name, vec![], std::sync::Arc::new(Noop))
    }

    #[test]
    fn duplicate_step_name_is_rejected() {
        let mut reg = CapabilityRegistry::new();
        reg.register_step(step("a")).expect("first ok");
        assert!(matches!(reg.register_step(step("a")), Err(CoreError::Registration(_))));
    }

    #[test]
    fn registration_after_freeze_is_rejected() {
        let mut reg = CapabilityRegistry::new();
        reg.freeze();
        assert!(matches!(reg.register_step(step("a")), Err(CoreError::Registration(_))));
        assert!(matches!(reg.register_handler(Arc::new(FakeHandler("json", &[".json"]))),
                         Err(CoreError::Registration(_))));
    }

    #[test]
    fn handler_lookup_prefers_name_then_extension() {
        let mut reg = CapabilityRegistry::new();
        reg.register_handler(Arc::new(FakeHandler("csv", &[".csv"]))).expect("csv ok");
        reg.register_handler(Arc::new(FakeHandler("json", &[".json"]))).expect("json ok");
        assert_eq!(reg.lookup_handler("csv").map(|h| h.name().to_string()), Some("csv".into()));
        assert_eq!(reg.lookup_handler(".json").map(|h| h.name().to_string()), Some("json".into()));
        assert!(reg.lookup_handler(".parquet").is_none());
    }

    #[test]
    fn rediscovery_of_same_scope_is_a_noop() {
        let mut reg = CapabilityRegistry::new();
        reg.discover("builtin", |r| r.register_step(step("a"))).expect("first scan ok");
        // Repetir el alcance no intenta re-registrar.
        reg.discover("builtin", |r| r.register_step(step("a"))).expect("rescan is a no-op");
        assert_eq!(reg.step_names().count(), 1);
    }
}
