//! Step fuente: materializa el dataset inicial del case.
//!
//! No transforma nada: fuerza la carga perezosa del binding `raw_events` y
//! re-emite el valor bajo el nombre lógico `events`, dejando el dataset
//! disponible (y cacheado) para el resto del pipeline.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use nexus_core::{CoreError, ParamSpec, PluginCallable, PluginContext, StepSpec, ValueKind};

#[derive(Debug)]
pub struct InitialDataReader;

impl PluginCallable for InitialDataReader {
    fn call(&self, ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
        let data = ctx.config["raw_events"].clone();
        let records = data.as_array().map(Vec::len).unwrap_or(0);
        info!(records, "initial dataset loaded");
        Ok(Some(data))
    }
}

pub fn spec() -> StepSpec {
    StepSpec::new("initial_data_reader",
                  vec![ParamSpec::input("raw_events", "raw_events", ValueKind::Json),
                       ParamSpec::output("out", "events")],
                  Arc::new(InitialDataReader))
}
