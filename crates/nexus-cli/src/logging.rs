use tracing_subscriber::EnvFilter;

/// Inicializa el logging estructurado. `RUST_LOG` manda si está definida; si
/// no, se usa el nivel pedido por línea de comandos.
pub fn init(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
