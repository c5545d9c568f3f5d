//! Chequeo de tipos pre-vuelo.
//!
//! Antes de ejecutar el primer step se compara, para cada binding de entrada
//! descubierto, el tipo que el step declara necesitar contra el contrato de
//! tipo que el handler resuelto promete producir. Los hallazgos se recolectan
//! completos; la política (warning o aborto) la decide el orquestador según
//! `strict_type_check`.

use tracing::warn;

use crate::discovery::IoDeclarations;
use crate::model::ValueKind;
use crate::registry::CapabilityRegistry;

/// Un desajuste detectado entre tipo declarado y tipo producido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFinding {
    pub step: String,
    pub field: String,
    pub logical_name: String,
    pub declared: ValueKind,
    pub produced: ValueKind,
}

impl std::fmt::Display for TypeFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,
               "step '{}' field '{}' expects {} but handler for '{}' produces {}",
               self.step, self.field, self.declared, self.logical_name, self.produced)
    }
}

/// Recorre todas las entradas declaradas y devuelve los hallazgos.
///
/// Un binding sin handler resoluble no es un hallazgo de tipos: se omite con
/// warning (el fallo concreto aflorará en la carga).
pub fn check(decls: &IoDeclarations, registry: &CapabilityRegistry) -> Vec<TypeFinding> {
    let mut findings = Vec::new();

    for (step, sources) in &decls.per_step_sources {
        for source in sources {
            let Some(binding) = decls.base_bindings.get(&source.logical_name) else {
                continue;
            };
            let handler = match binding.handler.as_deref() {
                Some(name) => registry.lookup_handler(name),
                None => binding.path
                               .extension()
                               .and_then(|e| e.to_str())
                               .and_then(|e| registry.lookup_handler(&format!(".{e}"))),
            };
            let Some(handler) = handler else {
                warn!(step = %step, name = %source.logical_name,
                      "pre-flight type check skipped: no resolvable handler");
                continue;
            };

            let produced = handler.produced_kind();
            if !source.expected.accepts(produced) {
                findings.push(TypeFinding { step: step.clone(),
                                            field: source.field.clone(),
                                            logical_name: source.logical_name.clone(),
                                            declared: source.expected,
                                            produced });
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SourceRef;
    use crate::errors::CoreError;
    use crate::handler::DataHandler;
    use crate::model::BindingDescriptor;
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;

    struct KindHandler(&'static str, ValueKind);
    impl DataHandler for KindHandler {
        fn name(&self) -> &str {
            self.0
        }
        fn produced_kind(&self) -> ValueKind {
            self.1
        }
        fn load(&self, _path: &Path, _args: &Value) -> Result<Value, CoreError> {
            Ok(Value::Null)
        }
        fn save(&self, _value: &Value, _path: &Path, _args: &Value) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn decls_with(expected: ValueKind, handler: &str) -> IoDeclarations {
        let mut decls = IoDeclarations::default();
        let mut b = BindingDescriptor::new("in.dat");
        b.handler = Some(handler.to_string());
        decls.base_bindings.insert("events".into(), b);
        decls.per_step_sources.insert("double_value".into(),
                                      vec![SourceRef { field: "events".into(),
                                                       logical_name: "events".into(),
                                                       expected }]);
        decls
    }

    fn registry() -> CapabilityRegistry {
        let mut reg = CapabilityRegistry::new();
        reg.register_handler(Arc::new(KindHandler("csv", ValueKind::Table))).expect("csv");
        reg.register_handler(Arc::new(KindHandler("text", ValueKind::Text))).expect("text");
        reg.freeze();
        reg
    }

    #[test]
    fn exact_match_passes() {
        let findings = check(&decls_with(ValueKind::Table, "csv"), &registry());
        assert!(findings.is_empty());
    }

    #[test]
    fn json_supertype_accepts_any_produced_kind() {
        let findings = check(&decls_with(ValueKind::Json, "text"), &registry());
        assert!(findings.is_empty());
    }

    #[test]
    fn mismatch_yields_exactly_one_finding_with_identities() {
        let findings = check(&decls_with(ValueKind::Table, "text"), &registry());
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.step, "double_value");
        assert_eq!(f.logical_name, "events");
        assert_eq!(f.declared, ValueKind::Table);
        assert_eq!(f.produced, ValueKind::Text);
    }

    #[test]
    fn unresolvable_handler_is_skipped_not_reported() {
        let findings = check(&decls_with(ValueKind::Table, "parquet"), &registry());
        assert!(findings.is_empty());
    }
}
