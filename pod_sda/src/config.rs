//! Configuration bundle for the SDA.
//!
//! Loads `pod.toml`, validates it, then loads the abort-range table it
//! points at. Any failure is fatal before the cycle loop starts.

use std::path::Path;

use pod_common::abort::AbortTable;
use pod_common::config::{ConfigError, ConfigLoader, PodConfig};
use tracing::info;

/// Complete validated configuration, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub pod: PodConfig,
    pub abort_table: AbortTable,
}

/// Load and validate `pod.toml` and its abort table.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let pod = PodConfig::load(path)?;
    pod.validate()?;

    let table_path = pod.abort_table_path(path);
    let abort_table = AbortTable::load(&table_path)?;

    info!(
        config = %path.display(),
        abort_table = %table_path.display(),
        rows = abort_table.len(),
        "configuration loaded"
    );

    Ok(LoadedConfig { pod, abort_table })
}

/// Build a bundle from in-memory text. Used by tests and benches.
pub fn load_config_from_strings(
    pod_toml: &str,
    abort_table: &str,
) -> Result<LoadedConfig, ConfigError> {
    let pod: PodConfig =
        toml::from_str(pod_toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    pod.validate()?;
    let abort_table = AbortTable::parse(abort_table)?;
    Ok(LoadedConfig { pod, abort_table })
}
