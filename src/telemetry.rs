//! Telemetry helpers for applications embedding `datavis3d-rs`.
//!
//! Range repairs, rejected mutations and sync-pass summaries are reported
//! through `tracing`. Consumers can either call `init_default_tracing` or wire
//! their own subscriber and filters (e.g. `RUST_LOG=datavis3d_rs=debug`).

/// Filter used when `RUST_LOG` is unset: repairs and downgrades only.
pub const DEFAULT_FILTER: &str = "datavis3d_rs=warn";

/// Initializes a default `tracing` subscriber when the `telemetry` feature is enabled.
///
/// Returns `true` when initialization succeeds.
/// Returns `false` when no initialization is performed (feature disabled) or if a
/// global subscriber was already set by the host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::init_default_tracing;

    #[test]
    fn second_initialization_is_refused() {
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
