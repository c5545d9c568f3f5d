//! Handler de directorios de trabajo.
//!
//! No carga contenido: entrega la ruta del directorio, creándolo bajo
//! demanda, para que los steps escriban artefactos sueltos dentro. Por eso
//! esquiva el chequeo de existencia previa del exchange.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use nexus_core::{CoreError, DataHandler, ValueKind};

pub struct DirectoryHandler;

impl DataHandler for DirectoryHandler {
    fn name(&self) -> &str {
        "directory"
    }

    fn produced_kind(&self) -> ValueKind {
        ValueKind::Directory
    }

    fn handles_directories(&self) -> bool {
        true
    }

    fn load(&self, path: &Path, _args: &Value) -> Result<Value, CoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "creating working directory on demand");
            std::fs::create_dir_all(path).map_err(|e| CoreError::Io { path: path.to_path_buf(),
                                                                      source: e })?;
        }
        Ok(Value::String(path.display().to_string()))
    }

    fn save(&self, _value: &Value, path: &Path, _args: &Value) -> Result<(), CoreError> {
        Err(CoreError::SinkWrite { path: path.to_path_buf(),
                                   reason: "a directory is a location, not a writable value".into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_creates_the_directory_and_returns_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("workdir");
        assert!(!target.exists());
        let value = DirectoryHandler.load(&target, &Value::Null).expect("load ok");
        assert!(target.is_dir());
        assert_eq!(value, Value::String(target.display().to_string()));
    }

    #[test]
    fn save_is_not_supported() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(DirectoryHandler.save(&Value::Null, dir.path(), &Value::Null),
                         Err(CoreError::SinkWrite { .. })));
    }
}
