// Application-wide tracing setup
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "info";

/// Handle to the installed filter, so the settings file can adjust it later
pub struct LogFilter {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

/// Install the global subscriber.
///
/// Called before anything else runs so startup messages are not lost.
/// `RUST_LOG` wins when set; otherwise `info` until `apply_settings`.
pub fn init() -> LogFilter {
    let env = EnvFilter::try_from_default_env();
    let from_env = env.is_ok();
    let (filter, handle) = reload::Layer::new(env.unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .try_init();

    match installed {
        Ok(()) => LogFilter { handle: Some(handle), from_env },
        Err(_) => {
            tracing::debug!("tracing subscriber already installed");
            LogFilter { handle: None, from_env }
        }
    }
}

impl LogFilter {
    /// Switch to the `logging.filter` from the settings file unless `RUST_LOG` is set
    pub fn apply_settings(&self, filter: &str) {
        if self.from_env {
            return;
        }
        if let Some(handle) = self.handle.as_ref() {
            if let Err(e) = handle.reload(settings_filter(filter)) {
                tracing::warn!("failed to apply logging filter: {e}");
            }
        }
    }
}

fn settings_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|e| {
        tracing::warn!("invalid logging filter {filter:?}: {e}, using {DEFAULT_FILTER}");
        EnvFilter::new(DEFAULT_FILTER)
    })
}
