//! Parseo de overrides `--set clave=valor` hacia la capa CLI de config.

use serde_json::{Map, Value};

use nexus_core::deep_merge;

/// Convierte pares `clave=valor` en un objeto de overrides. Las claves con
/// puntos anidan (`render.fps=60`); el valor se interpreta como JSON cuando
/// parsea, si no queda como texto literal.
pub fn parse_set_pairs(pairs: &[String]) -> Result<Value, String> {
    let mut acc = Value::Object(Map::new());
    for pair in pairs {
        let (key, raw) = pair.split_once('=')
                             .ok_or_else(|| format!("override '{pair}' must have the form key=value"))?;
        if key.is_empty() {
            return Err(format!("override '{pair}' has an empty key"));
        }
        let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        // Construye el objeto anidado de adentro hacia afuera.
        let mut nested = value;
        for part in key.split('.').rev() {
            if part.is_empty() {
                return Err(format!("override '{pair}' has an empty path segment"));
            }
            let mut wrapper = Map::new();
            wrapper.insert(part.to_string(), nested);
            nested = Value::Object(wrapper);
        }
        acc = deep_merge(&acc, &nested);
    }
    Ok(acc)
}
