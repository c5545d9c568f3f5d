//! Ejecución de un step con sus argumentos resueltos.
//!
//! La resolución de cada parámetro declarado sale de un conjunto cerrado de
//! estrategias (config hidratada, logger del run, contexto completo, dato por
//! nombre); aquí no hay introspección ni reintentos. Toda excepción del
//! callable se envuelve con la identidad del step y su posición, y se
//! re-lanza.

use serde_json::Value;
use tracing::{info, info_span};

use crate::discovery::SourceRef;
use crate::errors::CoreError;
use crate::exchange::DataExchange;
use crate::plugin::{PluginContext, StepSpec};

/// Hidratación: sustituye los campos input-binding del mapa crudo por los
/// valores obtenidos del exchange, antes de construir el objeto de config
/// definitivo. Dos fases explícitas: nunca existe un objeto parcialmente
/// válido.
pub fn hydrate_config(raw: Value,
                      sources: &[SourceRef],
                      exchange: &mut DataExchange)
                      -> Result<Value, CoreError> {
    let mut map = match raw {
        Value::Object(m) => m,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(CoreError::Configuration(format!("parameter map must be a mapping, got {other}")));
        }
    };
    for source in sources {
        let value = exchange.get(&source.logical_name)?;
        map.insert(source.field.clone(), value);
    }
    Ok(Value::Object(map))
}

/// Invoca el callable del step con la config ya hidratada.
pub fn execute(spec: &StepSpec,
               position: usize,
               config: Value,
               exchange: &mut DataExchange)
               -> Result<Option<Value>, CoreError> {
    let span = info_span!("step", name = %spec.name, position);
    let _guard = span.enter();

    info!("executing step");
    let case_path = exchange.case_path().to_path_buf();
    let mut ctx = PluginContext { config,
                                  exchange,
                                  case_path: &case_path,
                                  step_name: &spec.name };

    match spec.callable.call(&mut ctx) {
        Ok(value) => {
            info!("step finished");
            Ok(value)
        }
        Err(e) => Err(CoreError::in_plugin(&spec.name, position, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueKind;
    use crate::plugin::{ParamSpec, PluginCallable};
    use crate::registry::CapabilityRegistry;
    use indexmap::IndexMap;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Failing;
    impl PluginCallable for Failing {
        fn call(&self, _ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
            Err(CoreError::Configuration("boom".into()))
        }
    }

    #[derive(Debug)]
    struct EchoConfig;
    impl PluginCallable for EchoConfig {
        fn call(&self, ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
            Ok(Some(ctx.config.clone()))
        }
    }

    fn empty_exchange() -> DataExchange {
        let mut reg = CapabilityRegistry::new();
        reg.freeze();
        DataExchange::new(std::env::temp_dir(), Arc::new(reg), IndexMap::new())
    }

    #[test]
    fn callable_failure_is_wrapped_with_step_identity() {
        let spec = StepSpec::new("fragile", vec![], Arc::new(Failing));
        let err = execute(&spec, 3, Value::Null, &mut empty_exchange()).expect_err("must fail");
        match err {
            CoreError::PluginExecution { step, position, .. } => {
                assert_eq!(step, "fragile");
                assert_eq!(position, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hydration_replaces_input_fields_before_construction() {
        let mut ex = empty_exchange();
        ex.insert("events", json!([{"value": 1}]));
        let sources = vec![SourceRef { field: "events".into(),
                                       logical_name: "events".into(),
                                       expected: ValueKind::Table }];
        let hydrated = hydrate_config(json!({"factor": 2}), &sources, &mut ex).expect("hydrate ok");
        assert_eq!(hydrated["factor"], 2);
        assert_eq!(hydrated["events"], json!([{"value": 1}]));
    }

    #[test]
    fn executor_passes_hydrated_config_to_the_callable() {
        let spec = StepSpec::new("echo", vec![ParamSpec::config("k")], Arc::new(EchoConfig));
        let out = execute(&spec, 0, json!({"k": 7}), &mut empty_exchange()).expect("run ok");
        assert_eq!(out, Some(json!({"k": 7})));
    }
}
