//! Step de transformación: multiplica la columna `value` de una tabla.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use nexus_core::{CoreError, ParamSpec, ParamType, PluginCallable, PluginContext, StepSpec, ValueKind};

#[derive(Debug)]
pub struct DoubleValue;

/// Un entero multiplicado por un factor entero sigue siendo entero; el
/// resultado pasa a flotante cuando alguno de los dos lo es, o cuando el
/// producto entero desborda.
fn multiply(cell: &Value, factor: &Value) -> Value {
    if let (Some(c), Some(f)) = (cell.as_i64(), factor.as_i64()) {
        if let Some(product) = c.checked_mul(f) {
            return json!(product);
        }
    }
    let c = cell.as_f64().unwrap_or(0.0);
    let f = factor.as_f64().unwrap_or(1.0);
    json!(c * f)
}

impl PluginCallable for DoubleValue {
    fn call(&self, ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
        let factor = ctx.config["factor"].clone();
        let rows = ctx.config["events"].as_array().cloned().ok_or_else(|| {
                       CoreError::Configuration(format!("step '{}': input 'events' is not a table", ctx.step_name))
                   })?;

        // El orden de filas de la entrada se preserva tal cual.
        let out: Vec<Value> = rows.into_iter()
                                  .map(|mut row| {
                                      if let Some(cell) = row.get("value").cloned() {
                                          row["value"] = multiply(&cell, &factor);
                                      }
                                      row
                                  })
                                  .collect();
        info!(rows = out.len(), factor = %factor, "values scaled");
        Ok(Some(Value::Array(out)))
    }
}

pub fn spec() -> StepSpec {
    StepSpec::new("double_value",
                  vec![ParamSpec::config("factor").with_default(json!(2)).typed(ParamType::Number),
                       ParamSpec::input("events", "events", ValueKind::Table),
                       ParamSpec::output("out", "doubled")],
                  Arc::new(DoubleValue))
}
