use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use cellcalc_engine::engine::EngineConfig;

pub(crate) fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Load the engine config.
///
/// An explicit path must exist and parse. Otherwise the default file is used
/// when present; problems with it only produce a warning.
pub(crate) fn load_config(explicit: Option<&Path>, skip_default: bool) -> anyhow::Result<EngineConfig> {
    if let Some(path) = explicit {
        let config = EngineConfig::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?;
        return Ok(config);
    }
    if skip_default {
        return Ok(EngineConfig::default());
    }
    let Some(path) = default_config_path().filter(|p| p.is_file()) else {
        return Ok(EngineConfig::default());
    };
    match EngineConfig::load(&path) {
        Ok(config) => {
            log::info!("loaded config from {}", path.display());
            Ok(config)
        }
        Err(e) => {
            log::warn!("Failed to load {}: {}", path.display(), e);
            Ok(EngineConfig::default())
        }
    }
}
