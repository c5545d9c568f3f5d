//! Step de verificación de calidad: sólo observa, nunca escribe.
//!
//! Cuenta las filas cuyo `value` queda fuera del rango configurado y reporta
//! columnas ausentes por el logger del run. Sin sink declarado: sus hallazgos
//! viven en el log, no en el exchange.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use nexus_core::{CoreError, ParamRole, ParamSpec, ParamType, PluginCallable, PluginContext, StepSpec, ValueKind};

#[derive(Debug)]
pub struct QualityCheck;

impl PluginCallable for QualityCheck {
    fn call(&self, ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
        let column = ctx.config["column"].as_str().unwrap_or("value").to_string();
        let max_value = ctx.config["max_value"].as_f64().unwrap_or(f64::INFINITY);
        let min_value = ctx.config["min_value"].as_f64().unwrap_or(f64::NEG_INFINITY);
        let rows = ctx.config["events"].as_array().cloned().ok_or_else(|| {
                       CoreError::Configuration(format!("step '{}': input 'events' is not a table", ctx.step_name))
                   })?;

        info!(rows = rows.len(), column = %column, "quality check starting");

        let missing = rows.iter().filter(|r| r.get(&column).is_none()).count();
        if missing > 0 {
            warn!(column = %column, rows = missing, "rows without the checked column");
        }

        let mut above = 0usize;
        let mut below = 0usize;
        for row in &rows {
            let Some(v) = row.get(&column).and_then(Value::as_f64) else {
                continue;
            };
            if v > max_value {
                above += 1;
            } else if v < min_value {
                below += 1;
            }
        }

        if above + below > 0 {
            warn!(column = %column, above, below, "rows outside the configured range");
        } else {
            info!(column = %column, "all rows within range");
        }
        Ok(None)
    }
}

pub fn spec() -> StepSpec {
    let mut log = ParamSpec::config("log");
    log.role = ParamRole::Logger;
    StepSpec::new("quality_check",
                  vec![ParamSpec::config("column").with_default(json!("value")).typed(ParamType::String),
                       ParamSpec::config("max_value").with_default(json!(100)).typed(ParamType::Number),
                       ParamSpec::config("min_value").with_default(json!(0)).typed(ParamType::Number),
                       log,
                       ParamSpec::input("events", "events", ValueKind::Table)],
                  Arc::new(QualityCheck))
}
