//! nexus-core: runtime declarativo de pipelines por case.
pub mod config;
pub mod discovery;
pub mod errors;
pub mod exchange;
pub mod executor;
pub mod handler;
pub mod model;
pub mod plugin;
pub mod registry;
pub mod runner;
pub mod typecheck;

pub use config::{deep_merge, resolve, select_for_step, ConfigLayer, MergedConfig};
pub use discovery::{discover, IoDeclarations, SinkRef, SourceRef};
pub use errors::CoreError;
pub use exchange::DataExchange;
pub use executor::{execute, hydrate_config};
pub use handler::DataHandler;
pub use model::{BindingDescriptor, CaseConfig, GlobalConfig, IoMappingEntry, ParamType, PipelineStep, ValueKind};
pub use plugin::{ParamRole, ParamSpec, PluginCallable, PluginContext, StepSpec};
pub use registry::CapabilityRegistry;
pub use runner::{PipelineRunner, RunPhase, RunReport};
pub use typecheck::{check, TypeFinding};
