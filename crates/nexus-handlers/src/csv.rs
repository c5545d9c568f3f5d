//! Handler CSV: tablas como arreglos de objetos fila.

use std::path::Path;

use serde_json::{Map, Value};

use nexus_core::{CoreError, DataHandler, ValueKind};

pub struct CsvHandler;

/// Celdas numéricas tipadas en la carga: entero si cabe, si no flotante, si
/// no texto tal cual. Los enteros se preservan como enteros.
fn parse_cell(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::from(f);
    }
    Value::String(raw.to_string())
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn delimiter(args: &Value) -> u8 {
    args.get("delimiter")
        .and_then(Value::as_str)
        .and_then(|s| s.bytes().next())
        .unwrap_or(b',')
}

impl DataHandler for CsvHandler {
    fn name(&self) -> &str {
        "csv"
    }

    fn extensions(&self) -> &[&str] {
        &[".csv"]
    }

    fn produced_kind(&self) -> ValueKind {
        ValueKind::Table
    }

    fn load(&self, path: &Path, args: &Value) -> Result<Value, CoreError> {
        let mut reader = csv::ReaderBuilder::new().delimiter(delimiter(args))
                                                  .from_path(path)
                                                  .map_err(|e| CoreError::DataSource { name: "csv".into(),
                                                                                       path: path.to_path_buf(),
                                                                                       reason: e.to_string() })?;
        let headers = reader.headers()
                            .map_err(|e| malformed(path, e))?
                            .clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| malformed(path, e))?;
            let mut row = Map::with_capacity(headers.len());
            for (header, cell) in headers.iter().zip(record.iter()) {
                row.insert(header.to_string(), parse_cell(cell));
            }
            rows.push(Value::Object(row));
        }
        Ok(Value::Array(rows))
    }

    fn save(&self, value: &Value, path: &Path, args: &Value) -> Result<(), CoreError> {
        let rows = value.as_array().ok_or_else(|| {
                                       CoreError::SinkWrite { path: path.to_path_buf(),
                                                              reason: "csv sink expects an array of row objects".into() }
                                   })?;

        // El orden de columnas es el de primera aparición entre las filas.
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            if let Value::Object(m) = row {
                for key in m.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        let mut writer = csv::WriterBuilder::new().delimiter(delimiter(args))
                                                  .from_path(path)
                                                  .map_err(|e| write_failed(path, e))?;
        writer.write_record(&columns).map_err(|e| write_failed(path, e))?;
        for row in rows {
            let record: Vec<String> = columns.iter()
                                             .map(|c| row.get(c).map(cell_to_string).unwrap_or_default())
                                             .collect();
            writer.write_record(&record).map_err(|e| write_failed(path, e))?;
        }
        writer.flush().map_err(|e| CoreError::SinkWrite { path: path.to_path_buf(), reason: e.to_string() })?;
        Ok(())
    }
}

fn malformed(path: &Path, e: csv::Error) -> CoreError {
    CoreError::DataSource { name: "csv".into(),
                            path: path.to_path_buf(),
                            reason: format!("malformed csv: {e}") }
}

fn write_failed(path: &Path, e: csv::Error) -> CoreError {
    CoreError::SinkWrite { path: path.to_path_buf(), reason: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_types_cells_and_preserves_row_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("events.csv");
        std::fs::write(&file, "id,value,label\n1,2.5,alpha\n2,7,beta\n").expect("fixture");

        let table = CsvHandler.load(&file, &Value::Null).expect("load ok");
        assert_eq!(table,
                   json!([{"id": 1, "value": 2.5, "label": "alpha"},
                          {"id": 2, "value": 7, "label": "beta"}]));
    }

    #[test]
    fn save_then_load_keeps_column_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("out.csv");
        let table = json!([{"value": 2, "id": 1}, {"value": 4, "id": 2}]);
        CsvHandler.save(&table, &file, &Value::Null).expect("save ok");

        let raw = std::fs::read_to_string(&file).expect("read back");
        assert!(raw.starts_with("value,id\n"));
        let reloaded = CsvHandler.load(&file, &Value::Null).expect("reload ok");
        assert_eq!(reloaded, table);
    }

    #[test]
    fn custom_delimiter_via_handler_args() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("semi.csv");
        std::fs::write(&file, "a;b\n1;2\n").expect("fixture");
        let table = CsvHandler.load(&file, &json!({"delimiter": ";"})).expect("load ok");
        assert_eq!(table, json!([{"a": 1, "b": 2}]));
    }

    #[test]
    fn non_tabular_value_is_rejected_on_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = CsvHandler.save(&json!("not a table"), &dir.path().join("x.csv"), &Value::Null)
                            .expect_err("must fail");
        assert!(matches!(err, CoreError::SinkWrite { .. }));
    }
}
