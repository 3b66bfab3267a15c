//! Opt-in tracing setup for hosts embedding `dsl-graphs`.
//!
//! Controllers log layout recomputation at `debug` and per-frame geometry
//! at `trace`. Hosts that already run a subscriber need nothing from here.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "dsl_graphs=info";

/// Installs a compact `tracing` subscriber filtered by `RUST_LOG`, falling
/// back to [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is off or a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing(DEFAULT_FILTER)
}

/// Like [`init_default_tracing`] with a caller-chosen fallback filter,
/// e.g. `"dsl_graphs=trace"` while debugging path geometry.
#[must_use]
pub fn init_tracing(fallback_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback_filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_filter;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{init_default_tracing, init_tracing};

    #[test]
    fn subscriber_is_installed_at_most_once() {
        let first = init_tracing("dsl_graphs=debug");
        assert!(!init_default_tracing());
        assert_eq!(first, cfg!(feature = "telemetry"));
    }
}
