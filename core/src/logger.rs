//! Optional response logger.
//!
//! The client reports raw register and push responses through a `Logger`
//! when one is supplied. `TracingLogger` forwards to the `tracing` macros so
//! the messages reach whatever subscriber the application installed.

/// A sink with a single info-level method.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
}

/// Forwards messages to `tracing::info!` under the `zeppelin` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "zeppelin", "{message}");
    }
}
