//! Handler de texto plano.

use std::path::Path;

use serde_json::Value;

use nexus_core::{CoreError, DataHandler, ValueKind};

pub struct TextHandler;

impl DataHandler for TextHandler {
    fn name(&self) -> &str {
        "text"
    }

    fn extensions(&self) -> &[&str] {
        &[".txt", ".log", ".md"]
    }

    fn produced_kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn load(&self, path: &Path, _args: &Value) -> Result<Value, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CoreError::Io { path: path.to_path_buf(),
                                                                            source: e })?;
        Ok(Value::String(raw))
    }

    fn save(&self, value: &Value, path: &Path, _args: &Value) -> Result<(), CoreError> {
        // Cualquier valor no textual se serializa a su forma JSON.
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        std::fs::write(path, rendered).map_err(|e| CoreError::SinkWrite { path: path.to_path_buf(),
                                                                          reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("note.txt");
        TextHandler.save(&Value::String("hola\nmundo".into()), &file, &Value::Null).expect("save ok");
        assert_eq!(TextHandler.load(&file, &Value::Null).expect("load ok"),
                   Value::String("hola\nmundo".into()));
    }
}
