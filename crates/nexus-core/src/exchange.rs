//! DataExchange: almacén de datos del run, perezoso y memoizado.
//!
//! Una instancia por run; la cache se descarta junto con la instancia al
//! terminar. Carga desde almacenamiento físico vía handler en el primer
//! acceso (a lo sumo una carga por nombre lógico) y persiste las salidas de
//! los steps. Runs concurrentes usan instancias separadas: el exchange no
//! provee aislamiento entre runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::handler::DataHandler;
use crate::model::BindingDescriptor;
use crate::registry::CapabilityRegistry;

pub struct DataExchange {
    case_path: PathBuf,
    registry: Arc<CapabilityRegistry>,
    bindings: IndexMap<String, BindingDescriptor>,
    cache: HashMap<String, Value>,
}

/// Resuelve un handler por nombre explícito o, en su defecto, por la
/// extensión de la ruta.
fn resolve_handler(registry: &CapabilityRegistry,
                   explicit: Option<&str>,
                   path: &Path)
                   -> Result<Arc<dyn DataHandler>, CoreError> {
    if let Some(name) = explicit {
        return registry.lookup_handler(name)
                       .ok_or_else(|| CoreError::Configuration(format!("unknown handler '{name}'")));
    }
    let ext = path.extension()
                  .and_then(|e| e.to_str())
                  .map(|e| format!(".{e}"))
                  .unwrap_or_default();
    registry.lookup_handler(&ext).ok_or_else(|| {
                                     CoreError::Configuration(format!("no handler claims extension '{}' for {}",
                                                                      ext,
                                                                      path.display()))
                                 })
}

impl DataExchange {
    pub fn new(case_path: impl Into<PathBuf>,
               registry: Arc<CapabilityRegistry>,
               bindings: IndexMap<String, BindingDescriptor>)
               -> Self {
        Self { case_path: case_path.into(),
               registry,
               bindings,
               cache: HashMap::new() }
    }

    pub fn case_path(&self) -> &Path {
        &self.case_path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains_key(name) || self.bindings.contains_key(name)
    }

    /// Obtiene un valor por nombre lógico.
    ///
    /// Cache primero; si no, carga perezosa vía handler del binding y
    /// memoización. Un valor cacheado nunca es sobreescrito por una lectura
    /// posterior. Nombre desconocido -> `NotFound`.
    pub fn get(&mut self, name: &str) -> Result<Value, CoreError> {
        if let Some(v) = self.cache.get(name) {
            debug!(name = %name, "exchange hit (memoized)");
            return Ok(v.clone());
        }

        let Some(binding) = self.bindings.get(name) else {
            return Err(CoreError::NotFound(format!("data '{name}' is not declared in this run")));
        };

        let path = binding.resolve_path(&self.case_path);
        let handler = resolve_handler(&self.registry, binding.handler.as_deref(), &path)?;

        if binding.must_exist && !path.exists() && !handler.handles_directories() {
            return Err(CoreError::DataSource { name: name.to_string(),
                                               path,
                                               reason: "required location does not exist".into() });
        }

        info!(name = %name, path = %path.display(), "lazy loading data source");
        let value = handler.load(&path, &binding.handler_args)
                           .map_err(|e| CoreError::DataSource { name: name.to_string(),
                                                                path: path.clone(),
                                                                reason: e.to_string() })?;
        self.cache.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Cachea un valor producido por un step bajo su nombre lógico. La
    /// primera escritura crea la entrada.
    pub fn insert(&mut self, name: &str, value: Value) {
        debug!(name = %name, "value registered in exchange");
        self.cache.insert(name.to_string(), value);
    }

    /// Persiste un valor en una ubicación física vía handler (explícito o
    /// inferido por extensión). La cache no guarda el valor escrito.
    pub fn save(&self,
                value: &Value,
                path: &Path,
                handler_name: Option<&str>,
                handler_args: &Value)
                -> Result<(), CoreError> {
        let target = if path.is_absolute() { path.to_path_buf() } else { self.case_path.join(path) };
        let handler = resolve_handler(&self.registry, handler_name, &target)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::SinkWrite { path: target.clone(),
                                                                               reason: e.to_string() })?;
        }
        handler.save(value, &target, handler_args)
               .map_err(|e| CoreError::SinkWrite { path: target.clone(), reason: e.to_string() })?;
        info!(path = %target.display(), "sink written");
        Ok(())
    }

    /// Resumen del estado del exchange (nombres en memoria y registrados).
    pub fn summary(&self) -> Value {
        let mut in_memory: Vec<&str> = self.cache.keys().map(|s| s.as_str()).collect();
        in_memory.sort_unstable();
        let registered: serde_json::Map<String, Value> =
            self.bindings
                .iter()
                .map(|(name, b)| {
                    (name.clone(),
                     serde_json::json!({
                         "path": b.path.display().to_string(),
                         "handler": b.handler.clone().unwrap_or_else(|| "default (by extension)".into()),
                     }))
                })
                .collect();
        serde_json::json!({ "in_memory": in_memory, "registered": registered })
    }
}
