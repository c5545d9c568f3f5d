//! Descubrimiento de declaraciones de E/S de los steps activos.
//!
//! Pre-escanea el esquema de cada step habilitado para extraer sus bindings
//! de entrada y salida, y resuelve los nombres lógicos contra el
//! `io_mapping` del case. Las salidas se registran por step pero no se
//! resuelven aquí: son destinos de escritura, resueltos al escribir.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{BindingDescriptor, IoMappingEntry, PipelineStep, ValueKind};
use crate::registry::CapabilityRegistry;

/// Referencia a un campo de entrada declarado por un step.
#[derive(Debug, Clone)]
pub struct SourceRef {
    pub field: String,
    pub logical_name: String,
    pub expected: ValueKind,
}

/// Referencia a un campo de salida declarado por un step.
#[derive(Debug, Clone)]
pub struct SinkRef {
    pub field: String,
    pub logical_name: String,
}

/// Resultado del pase de descubrimiento.
#[derive(Debug, Default)]
pub struct IoDeclarations {
    /// Nombre lógico -> binding resuelto (sólo entradas).
    pub base_bindings: IndexMap<String, BindingDescriptor>,
    /// Step -> campos de entrada declarados.
    pub per_step_sources: IndexMap<String, Vec<SourceRef>>,
    /// Step -> campos de salida declarados.
    pub per_step_sinks: IndexMap<String, Vec<SinkRef>>,
}

fn descriptor_from_entry(entry: &IoMappingEntry) -> BindingDescriptor {
    BindingDescriptor { path: entry.path.clone(),
                        handler: entry.handler.clone(),
                        handler_args: entry.handler_args.clone(),
                        must_exist: entry.must_exist }
}

/// Mapping de respaldo declarado en el propio esquema del step: un default
/// con forma `{path, handler?, must_exist?}`.
fn descriptor_from_default(default: &Value) -> Option<BindingDescriptor> {
    let path = default.get("path")?.as_str()?;
    let mut d = BindingDescriptor::new(path);
    d.handler = default.get("handler").and_then(|h| h.as_str()).map(str::to_string);
    if let Some(args) = default.get("handler_args") {
        d.handler_args = args.clone();
    }
    if let Some(m) = default.get("must_exist").and_then(Value::as_bool) {
        d.must_exist = m;
    }
    Some(d)
}

/// Pre-escaneo de los steps habilitados del pipeline.
///
/// Un step ausente del registro o deshabilitado se omite por completo: no
/// aporta bindings y nunca será ejecutado. Un nombre lógico declarado por dos
/// steps con ubicaciones distintas se reporta una vez; gana el último
/// descubierto.
pub fn discover(registry: &CapabilityRegistry,
                pipeline: &[PipelineStep],
                io_mapping: &IndexMap<String, IoMappingEntry>)
                -> IoDeclarations {
    let mut decls = IoDeclarations::default();

    for step in pipeline {
        if !step.enable {
            debug!(step = %step.plugin, "step disabled; skipped during discovery");
            continue;
        }
        let Some(spec) = registry.lookup_step(&step.plugin) else {
            warn!(step = %step.plugin, "step not registered; skipped during discovery");
            continue;
        };

        let mut sources = Vec::new();
        for (field, logical_name, expected) in spec.input_bindings() {
            let descriptor = match io_mapping.get(logical_name) {
                Some(entry) => Some(descriptor_from_entry(entry)),
                None => {
                    let fallback = spec.params
                                       .iter()
                                       .find(|p| p.name == field)
                                       .and_then(|p| p.default.as_ref())
                                       .and_then(descriptor_from_default);
                    if fallback.is_none() {
                        warn!(step = %spec.name, name = %logical_name,
                              "logical name is neither mapped in the case nor defaulted by the step");
                    }
                    fallback
                }
            };

            if let Some(descriptor) = descriptor {
                if let Some(previous) = decls.base_bindings.get(logical_name) {
                    if previous.path != descriptor.path {
                        warn!(name = %logical_name,
                              superseded = %previous.path.display(),
                              winner = %descriptor.path.display(),
                              "logical name declared with conflicting locations; last discovered wins");
                    }
                }
                decls.base_bindings.insert(logical_name.to_string(), descriptor);
            }

            sources.push(SourceRef { field: field.to_string(),
                                     logical_name: logical_name.to_string(),
                                     expected });
        }

        let sinks: Vec<SinkRef> = spec.output_bindings()
                                      .map(|(field, logical_name)| SinkRef { field: field.to_string(),
                                                                             logical_name: logical_name.to_string() })
                                      .collect();

        decls.per_step_sources.insert(spec.name.clone(), sources);
        decls.per_step_sinks.insert(spec.name.clone(), sinks);
    }

    if !decls.base_bindings.is_empty() {
        debug!(count = decls.base_bindings.len(), "data sources discovered from step schemas");
    }
    decls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreError;
    use crate::plugin::{ParamSpec, PluginCallable, PluginContext, StepSpec};
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Noop;
    impl PluginCallable for Noop {
        fn call(&self, _ctx: &mut PluginContext<'_>) -> Result<Option<Value>, CoreError> {
            Ok(None)
        }
    }

    fn registry_with(specs: Vec<StepSpec>) -> CapabilityRegistry {
        let mut reg = CapabilityRegistry::new();
        for s in specs {
            reg.register_step(s).expect("register ok");
        }
        reg.freeze();
        reg
    }

    fn mapping(pairs: &[(&str, &str)]) -> IndexMap<String, IoMappingEntry> {
        pairs.iter()
             .map(|(name, path)| {
                 (name.to_string(),
                  IoMappingEntry { path: PathBuf::from(path),
                                   handler: None,
                                   handler_args: Value::Null,
                                   must_exist: true })
             })
             .collect()
    }

    fn pipeline_step(plugin: &str, enable: bool) -> PipelineStep {
        PipelineStep { plugin: plugin.to_string(), enable, params: json!({}) }
    }

    #[test]
    fn disabled_step_contributes_no_bindings() {
        let reg = registry_with(vec![StepSpec::new("reader",
                                                   vec![ParamSpec::input("events", "events", ValueKind::Table)],
                                                   Arc::new(Noop))]);
        let decls = discover(&reg, &[pipeline_step("reader", false)], &mapping(&[("events", "in.csv")]));
        assert!(decls.base_bindings.is_empty());
        assert!(decls.per_step_sources.is_empty());
    }

    #[test]
    fn unregistered_step_is_skipped_entirely() {
        let reg = registry_with(vec![]);
        let decls = discover(&reg, &[pipeline_step("ghost", true)], &mapping(&[]));
        assert!(decls.per_step_sources.is_empty());
        assert!(decls.per_step_sinks.is_empty());
    }

    #[test]
    fn conflicting_locations_last_discovered_wins() {
        let reg = registry_with(vec![StepSpec::new("a",
                                                   vec![ParamSpec::input("events", "events", ValueKind::Table)
                                                            .with_default(json!({"path": "a.csv"}))],
                                                   Arc::new(Noop)),
                                     StepSpec::new("b",
                                                   vec![ParamSpec::input("events", "events", ValueKind::Table)
                                                            .with_default(json!({"path": "b.csv"}))],
                                                   Arc::new(Noop))]);
        // Sin io_mapping: ambos caen a su default de esquema, con rutas
        // distintas para el mismo nombre lógico.
        let decls = discover(&reg, &[pipeline_step("a", true), pipeline_step("b", true)], &mapping(&[]));
        assert_eq!(decls.base_bindings["events"].path, PathBuf::from("b.csv"));
    }

    #[test]
    fn output_bindings_are_recorded_but_not_resolved() {
        let reg = registry_with(vec![StepSpec::new("w",
                                                   vec![ParamSpec::output("out", "doubled")],
                                                   Arc::new(Noop))]);
        let decls = discover(&reg, &[pipeline_step("w", true)], &mapping(&[("doubled", "out.csv")]));
        assert!(decls.base_bindings.is_empty());
        assert_eq!(decls.per_step_sinks["w"][0].logical_name, "doubled");
    }

    #[test]
    fn case_mapping_takes_precedence_over_schema_default() {
        let reg = registry_with(vec![StepSpec::new("r",
                                                   vec![ParamSpec::input("events", "events", ValueKind::Table)
                                                            .with_default(json!({"path": "fallback.csv"}))],
                                                   Arc::new(Noop))]);
        let decls = discover(&reg, &[pipeline_step("r", true)], &mapping(&[("events", "mapped.csv")]));
        assert_eq!(decls.base_bindings["events"].path, PathBuf::from("mapped.csv"));
    }
}
