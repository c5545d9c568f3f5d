//! Orquestador del run: máquina de fases sobre los componentes del runtime.
//!
//! `INIT -> DISCOVER -> CONFIGURE -> PRECHECK -> RUN(i) -> DONE`, con
//! `FAILED` terminal alcanzable desde cualquier fase. Ejecución estrictamente
//! secuencial y síncrona: un step a la vez, sin reintentos ni rollback de
//! sinks ya escritos.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{self, ConfigLayer};
use crate::discovery::{self, IoDeclarations};
use crate::errors::CoreError;
use crate::exchange::DataExchange;
use crate::executor;
use crate::model::{CaseConfig, GlobalConfig, PipelineStep};
use crate::plugin::StepSpec;
use crate::registry::CapabilityRegistry;
use crate::typecheck::{self, TypeFinding};

/// Fase del run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Discover,
    Configure,
    Precheck,
    Run(usize),
    Done,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Init => write!(f, "INIT"),
            RunPhase::Discover => write!(f, "DISCOVER"),
            RunPhase::Configure => write!(f, "CONFIGURE"),
            RunPhase::Precheck => write!(f, "PRECHECK"),
            RunPhase::Run(i) => write!(f, "RUN({i})"),
            RunPhase::Done => write!(f, "DONE"),
            RunPhase::Failed => write!(f, "FAILED"),
        }
    }
}

/// Resultado observable de un run completo.
#[derive(Debug)]
pub struct RunReport {
    /// Steps ejecutados, en orden.
    pub executed: Vec<String>,
    /// Hallazgos del chequeo de tipos pre-vuelo.
    pub findings: Vec<TypeFinding>,
    /// Fase final (`Done` salvo pipeline vacío fallido antes).
    pub phase: RunPhase,
}

/// Step activo del pipeline: spec registrada + overrides del case.
struct ActiveStep {
    spec: StepSpec,
    case_params: Value,
}

/// Orquestador de una corrida. Posee en exclusiva la selección de steps, la
/// config resuelta y el `DataExchange` del run; el registro se comparte en
/// sólo lectura y sobrevive al run.
pub struct PipelineRunner {
    registry: Arc<CapabilityRegistry>,
    case_path: PathBuf,
    case: CaseConfig,
    global: GlobalConfig,
    cli_overrides: Value,
    phase: RunPhase,
}

impl PipelineRunner {
    pub fn new(registry: Arc<CapabilityRegistry>,
               case_path: impl Into<PathBuf>,
               case: CaseConfig,
               global: GlobalConfig,
               cli_overrides: Value)
               -> Self {
        Self { registry,
               case_path: case_path.into(),
               case,
               global,
               cli_overrides,
               phase: RunPhase::Init }
    }

    /// Construye el runner cargando `case.yaml` desde el directorio del case.
    pub fn from_case_dir(registry: Arc<CapabilityRegistry>,
                         case_path: &Path,
                         global: GlobalConfig,
                         cli_overrides: Value)
                         -> Result<Self, CoreError> {
        let case = CaseConfig::load(case_path)?;
        Ok(Self::new(registry, case_path, case, global, cli_overrides))
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Ejecuta el pipeline completo, o un único step cuando `only_step` está
    /// presente. Cualquier error transiciona a `FAILED` y detiene el run; los
    /// sinks ya escritos no se revierten.
    pub fn run(&mut self, only_step: Option<&str>) -> Result<RunReport, CoreError> {
        match self.drive(only_step) {
            Ok(report) => {
                self.phase = report.phase;
                Ok(report)
            }
            Err(e) => {
                self.phase = RunPhase::Failed;
                Err(e)
            }
        }
    }

    fn drive(&mut self, only_step: Option<&str>) -> Result<RunReport, CoreError> {
        self.phase = RunPhase::Init;
        info!(case = %self.case_path.display(), "pipeline run starting");

        // Selección de steps: filtro por nombre para corridas individuales.
        let selected: Vec<PipelineStep> = match only_step {
            Some(name) => {
                let filtered: Vec<PipelineStep> =
                    self.case.pipeline.iter().filter(|s| s.plugin == name).cloned().collect();
                if filtered.is_empty() {
                    return Err(CoreError::NotFound(format!("step '{name}' is not part of the case pipeline")));
                }
                filtered
            }
            None => self.case.pipeline.clone(),
        };

        if selected.is_empty() {
            warn!("pipeline is empty; nothing to run");
            return Ok(RunReport { executed: vec![], findings: vec![], phase: RunPhase::Done });
        }

        // DISCOVER: bindings y declaraciones de E/S de los steps habilitados.
        self.phase = RunPhase::Discover;
        let decls = discovery::discover(&self.registry, &selected, &self.case.io_mapping);

        // Los steps activos son los que sobrevivieron al descubrimiento.
        let active: Vec<ActiveStep> =
            selected.iter()
                    .filter(|s| decls.per_step_sources.contains_key(&s.plugin))
                    .filter_map(|s| {
                        self.registry
                            .lookup_step(&s.plugin)
                            .map(|spec| ActiveStep { spec: spec.clone(),
                                                     case_params: s.params.clone() })
                    })
                    .collect();

        // CONFIGURE: config cruda por step, antes de ejecutar nada. Errores
        // de configuración abortan aquí: ningún cableado roto llega a RUN.
        self.phase = RunPhase::Configure;
        let mut raw_configs: Vec<Value> = Vec::with_capacity(active.len());
        for step in &active {
            let layers = [ConfigLayer::new("step-defaults", step.spec.default_params()),
                          ConfigLayer::new("global", self.global.defaults.clone()),
                          ConfigLayer::new("case", self.case.params.clone()),
                          ConfigLayer::new("pipeline-entry", step.case_params.clone()),
                          ConfigLayer::new("cli", self.cli_overrides.clone())];
            let merged = config::resolve(&layers);
            raw_configs.push(config::select_for_step(&merged, &step.spec)?);
        }

        // PRECHECK: hallazgos de tipos para todo el pipeline, antes de RUN(0).
        self.phase = RunPhase::Precheck;
        let findings = typecheck::check(&decls, &self.registry);
        for f in &findings {
            warn!(step = %f.step, name = %f.logical_name, "pre-flight type mismatch: {f}");
        }
        if self.global.strict_type_check && !findings.is_empty() {
            return Err(CoreError::Configuration(format!(
                "pre-flight type check failed with {} finding(s) under strict policy",
                findings.len()
            )));
        }

        // RUN(i): hidratar, ejecutar, escribir sink. Stop-on-failure.
        let mut exchange = DataExchange::new(&self.case_path, Arc::clone(&self.registry), decls.base_bindings.clone());
        let mut executed = Vec::with_capacity(active.len());
        for (i, (step, raw)) in active.iter().zip(raw_configs).enumerate() {
            self.phase = RunPhase::Run(i);
            let config = if step.spec.has_config() {
                let sources = decls.per_step_sources
                                   .get(&step.spec.name)
                                   .map(Vec::as_slice)
                                   .unwrap_or(&[]);
                executor::hydrate_config(raw, sources, &mut exchange)?
            } else {
                Value::Null
            };

            let returned = executor::execute(&step.spec, i, config, &mut exchange)?;
            self.handle_output(&step.spec.name, returned, &decls, &mut exchange)?;
            executed.push(step.spec.name.clone());
        }

        debug!(exchange = %exchange.summary(), "exchange state at run end");
        info!("pipeline run finished successfully");
        Ok(RunReport { executed, findings, phase: RunPhase::Done })
    }

    /// Escritura del sink declarado, a cargo del orquestador (no del
    /// executor). Valor sin sink: nota de log. Sink sin valor: warning, sin
    /// escritura. Múltiples sinks: warning, gana el primero declarado.
    fn handle_output(&self,
                     step: &str,
                     returned: Option<Value>,
                     decls: &IoDeclarations,
                     exchange: &mut DataExchange)
                     -> Result<(), CoreError> {
        let sinks = decls.per_step_sinks.get(step).map(Vec::as_slice).unwrap_or(&[]);

        let Some(sink) = sinks.first() else {
            if returned.is_some() {
                debug!(step = %step, "step returned a value but declares no sink");
            }
            return Ok(());
        };
        if sinks.len() > 1 {
            warn!(step = %step, "multiple output bindings declared; first one wins");
        }

        let Some(value) = returned else {
            warn!(step = %step, sink = %sink.logical_name,
                  "step declares a sink but returned no value; nothing written");
            return Ok(());
        };

        // El valor producido queda disponible para steps posteriores.
        exchange.insert(&sink.logical_name, value.clone());

        match self.case.io_mapping.get(&sink.logical_name) {
            Some(entry) => {
                info!(step = %step, sink = %sink.logical_name, "writing step output to sink");
                exchange.save(&value, &entry.path, entry.handler.as_deref(), &entry.handler_args)
            }
            None => {
                warn!(step = %step, sink = %sink.logical_name,
                      "sink has no io_mapping entry; value cached in memory only");
                Ok(())
            }
        }
    }
}
