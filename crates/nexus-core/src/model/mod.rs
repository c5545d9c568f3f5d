//! Modelo de datos del runtime: valores neutrales, bindings y documentos.

pub mod binding;
pub mod case;
pub mod value;

pub use binding::BindingDescriptor;
pub use case::{CaseConfig, GlobalConfig, IoMappingEntry, PipelineStep};
pub use value::{ParamType, ValueKind};
