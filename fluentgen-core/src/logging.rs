//! Structured logging using **tracing**.
//!
//! The library only emits events; the binary decides where they go. Output
//! goes to stderr so stdout stays reserved for generated models.

use tracing::{error, info, warn};

use crate::model::FluentFactoryCompilationUnit;

/// Initializes the global tracing subscriber with JSON output on stderr.
///
/// Call once at startup. Filtering follows `RUST_LOG`
/// (e.g. `RUST_LOG=fluentgen_core=debug`). A second call is a no-op.
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

pub fn log_info(message: &str) {
    info!(detail = %message);
}

pub fn log_error(message: &str) {
    error!(detail = %message);
}

/// Logs a custom event, picking the level from the event name.
pub fn log_event(event: &str, detail: &str) {
    match event.to_uppercase().as_str() {
        "ERROR" => error!(event = %event, detail = %detail),
        "WARN" | "WARNING" => warn!(event = %event, detail = %detail),
        _ => info!(event = %event, detail = %detail),
    }
}

/// One summary event per finished compilation unit.
pub fn log_unit(unit: &FluentFactoryCompilationUnit) {
    let errors = unit.diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        warn!(
            root = %unit.root,
            errors,
            diagnostics = unit.diagnostics.len(),
            "unit has errors"
        );
    } else {
        info!(
            root = %unit.root,
            methods = unit.methods.len(),
            steps = unit.steps.len(),
            diagnostics = unit.diagnostics.len(),
            "unit generated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::FactoryRootType;

    #[test]
    fn test_logging_without_subscriber_is_silent() {
        log_info("info");
        log_warn("warn");
        log_error("error");
        log_event("WARNING", "detail");
        log_unit(&FluentFactoryCompilationUnit::empty(&FactoryRootType::new(
            Some("app"),
            "Factory",
        )));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_structured_logging();
        init_structured_logging();
    }
}
