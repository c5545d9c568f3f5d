//! Errores del runtime (taxonomía completa del core).
//!
//! Política de propagación:
//! - `Configuration` y `Registration` abortan antes de la fase RUN.
//! - `DataSource` durante la hidratación de un step aborta el run completo.
//! - `PluginExecution` es siempre fatal; envuelve la causa con la identidad
//!   del step y su posición en el pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Parámetro requerido ausente, valor inválido o documento malformado.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Registro duplicado o malformado de step/handler.
    #[error("registration error: {0}")]
    Registration(String),

    /// Ubicación física requerida ausente o fallo al cargar.
    #[error("data source '{name}' failed at {path}: {reason}")]
    DataSource { name: String, path: PathBuf, reason: String },

    /// Fallo al persistir la salida de un step.
    #[error("sink write failed at {path}: {reason}")]
    SinkWrite { path: PathBuf, reason: String },

    /// Excepción dentro del callable de un step. Fatal para el run.
    #[error("plugin '{step}' failed at pipeline position {position}")]
    PluginExecution {
        step: String,
        position: usize,
        #[source]
        source: Box<CoreError>,
    },

    /// Nombre lógico o step no declarado.
    #[error("not found: {0}")]
    NotFound(String),

    /// Error de E/S fuera de las categorías anteriores.
    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Envuelve un error producido dentro del callable de un step.
    pub fn in_plugin(step: &str, position: usize, source: CoreError) -> Self {
        CoreError::PluginExecution { step: step.to_string(),
                                     position,
                                     source: Box::new(source) }
    }
}
