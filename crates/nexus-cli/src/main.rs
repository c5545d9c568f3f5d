mod logging;
mod overrides;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use nexus_core::{CapabilityRegistry, CoreError, GlobalConfig, ParamRole, PipelineRunner};

#[derive(Parser)]
#[command(name = "nexus", version, about = "Declarative case-based pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline of a case
    Run {
        /// Case directory (must contain case.yaml); a relative path is
        /// resolved under the cases_root of global.yaml
        #[arg(long)]
        case: PathBuf,
        /// Run only the named step of the pipeline
        #[arg(long)]
        plugin: Option<String>,
        /// Configuration overrides, highest precedence (key=value, dotted keys nest)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Path to global.yaml (default: ./global.yaml when present)
        #[arg(long)]
        global: Option<PathBuf>,
    },
    /// List registered steps and data handlers
    Inspect,
}

fn build_registry() -> Result<Arc<CapabilityRegistry>, CoreError> {
    let mut registry = CapabilityRegistry::new();
    nexus_handlers::register_builtins(&mut registry)?;
    nexus_plugins::register_builtins(&mut registry)?;
    registry.freeze();
    Ok(Arc::new(registry))
}

fn load_global(explicit: Option<&Path>) -> Result<GlobalConfig, CoreError> {
    if let Some(file) = explicit {
        return GlobalConfig::load(file);
    }
    let local = Path::new("global.yaml");
    if local.exists() {
        return GlobalConfig::load(local);
    }
    Ok(GlobalConfig::default())
}

/// Un case absoluto se usa tal cual; uno relativo vive bajo `cases_root`.
fn resolve_case_path(case: &Path, global: &GlobalConfig) -> PathBuf {
    if case.is_absolute() {
        case.to_path_buf()
    } else {
        global.cases_root.join(case)
    }
}

fn run_case(case: &Path,
            plugin: Option<&str>,
            set: &[String],
            global: Option<&Path>)
            -> Result<(), CoreError> {
    let cli_overrides = overrides::parse_set_pairs(set).map_err(CoreError::Configuration)?;
    let registry = build_registry()?;
    let global = load_global(global)?;
    let case = resolve_case_path(case, &global);
    let mut runner = PipelineRunner::from_case_dir(registry, &case, global, cli_overrides)?;
    let report = runner.run(plugin)?;
    println!("{}: {} step(s) executed, {} type finding(s)",
             report.phase,
             report.executed.len(),
             report.findings.len());
    Ok(())
}

fn inspect() -> Result<(), CoreError> {
    let registry = build_registry()?;
    println!("steps:");
    for name in registry.step_names() {
        let Some(spec) = registry.lookup_step(name) else {
            continue;
        };
        let fields: Vec<String> = spec.params
                                      .iter()
                                      .map(|p| match &p.role {
                                          ParamRole::Config => p.name.clone(),
                                          ParamRole::Logger => format!("{} (logger)", p.name),
                                          ParamRole::Context => format!("{} (context)", p.name),
                                          ParamRole::InputBinding { logical_name, expected } => {
                                              format!("{} (in: {logical_name}, {expected})", p.name)
                                          }
                                          ParamRole::OutputBinding { logical_name } => {
                                              format!("{} (out: {logical_name})", p.name)
                                          }
                                      })
                                      .collect();
        println!("  {name}: {}", fields.join(", "));
    }
    println!("handlers:");
    for handler in registry.handlers() {
        println!("  {} -> {} [{}]",
                 handler.name(),
                 handler.produced_kind(),
                 handler.extensions().join(", "));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let outcome = match &cli.command {
        Commands::Run { case, plugin, set, global } => {
            run_case(case, plugin.as_deref(), set, global.as_deref())
        }
        Commands::Inspect => inspect(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_case_resolves_under_cases_root() {
        let global = GlobalConfig { cases_root: PathBuf::from("work/cases"), ..GlobalConfig::default() };
        assert_eq!(resolve_case_path(Path::new("demo"), &global),
                   PathBuf::from("work/cases/demo"));
    }

    #[test]
    fn absolute_case_ignores_cases_root() {
        let global = GlobalConfig { cases_root: PathBuf::from("work/cases"), ..GlobalConfig::default() };
        assert_eq!(resolve_case_path(Path::new("/data/cases/demo"), &global),
                   PathBuf::from("/data/cases/demo"));
    }
}
