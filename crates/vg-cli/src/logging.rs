//! Diagnostic tracing, separate from the user-facing output in `render`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub(crate) const LOG_ENV_VAR: &str = "VG_LOG";

/// Installs a compact stderr subscriber filtered by `VG_LOG` (default `warn`).
///
/// ```bash
/// VG_LOG=vg_installer=debug vg use 1.22.0
/// ```
pub(crate) fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
