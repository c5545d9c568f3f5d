//! Handler JSON: documentos arbitrarios, sin contrato tabular.

use std::path::Path;

use serde_json::Value;

use nexus_core::{CoreError, DataHandler, ValueKind};

pub struct JsonHandler;

impl DataHandler for JsonHandler {
    fn name(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &[".json"]
    }

    fn produced_kind(&self) -> ValueKind {
        ValueKind::Json
    }

    fn load(&self, path: &Path, _args: &Value) -> Result<Value, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CoreError::Io { path: path.to_path_buf(),
                                                                            source: e })?;
        serde_json::from_str(&raw).map_err(|e| CoreError::DataSource { name: "json".into(),
                                                                       path: path.to_path_buf(),
                                                                       reason: format!("malformed json: {e}") })
    }

    fn save(&self, value: &Value, path: &Path, args: &Value) -> Result<(), CoreError> {
        let pretty = args.get("pretty").and_then(Value::as_bool).unwrap_or(true);
        let rendered = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }.map_err(|e| CoreError::SinkWrite { path: path.to_path_buf(), reason: e.to_string() })?;
        std::fs::write(path, rendered).map_err(|e| CoreError::SinkWrite { path: path.to_path_buf(),
                                                                          reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_rejects_malformed_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("bad.json");
        std::fs::write(&file, "{ not json").expect("fixture");
        assert!(matches!(JsonHandler.load(&file, &Value::Null), Err(CoreError::DataSource { .. })));
    }

    #[test]
    fn save_and_load_arbitrary_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("doc.json");
        let doc = json!({"nested": {"list": [1, 2, 3]}});
        JsonHandler.save(&doc, &file, &Value::Null).expect("save ok");
        assert_eq!(JsonHandler.load(&file, &Value::Null).expect("load ok"), doc);
    }
}
