use std::path::Path;

use dragkit::{load_drag_config, DragConfig, LoopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Optional path to a JSON drag config file.
pub(crate) const DRAG_CONFIG_PATH_ENV_VAR: &str = "DRAGKIT_CONFIG";

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn build_loop_config() -> LoopConfig {
    info!("=== dragkit sandbox startup ===");
    LoopConfig {
        window_title: "dragkit kitchen".to_string(),
        drag: resolve_drag_config(),
        ..LoopConfig::default()
    }
}

/// File config when `DRAGKIT_CONFIG` names one, then `DRAGKIT_*` overrides on top.
pub(crate) fn resolve_drag_config() -> DragConfig {
    let base = match std::env::var(DRAG_CONFIG_PATH_ENV_VAR) {
        Ok(path) => drag_config_from_file(Path::new(&path)),
        Err(_) => DragConfig::default(),
    };
    base.with_env_overrides()
}

fn drag_config_from_file(path: &Path) -> DragConfig {
    match load_drag_config(path) {
        Ok(config) => {
            info!(path = %path.display(), "drag_config_loaded");
            config
        }
        Err(error) => {
            warn!(error = %error, "drag_config_invalid; using defaults");
            DragConfig::default()
        }
    }
}
