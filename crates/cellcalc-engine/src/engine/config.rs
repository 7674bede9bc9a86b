//! Engine configuration.
//!
//! Limits, cycle policy and grid bounds. Every field has a default, so an
//! empty TOML document (or a partial one) is a valid configuration:
//!
//! ```toml
//! max_depth = 20
//! max_range_cells = 200
//! cycle_policy = "depth-only"
//!
//! [grid]
//! num_cols = 10
//! num_rows = 20
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cycle::CyclePolicy;
use super::error::ConfigError;

/// Maximum nested cell dereferences in one top-level request.
pub const DEFAULT_MAX_DEPTH: usize = 20;
/// Maximum number of cells a single range may expand to.
pub const DEFAULT_MAX_RANGE_CELLS: usize = 200;
pub const NUM_COLS: usize = 10;
pub const NUM_ROWS: usize = 20;

/// Visible grid size, used to clamp directional movement (`--neighbours`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridBounds {
    pub num_cols: usize,
    pub num_rows: usize,
}

impl Default for GridBounds {
    fn default() -> Self {
        GridBounds {
            num_cols: NUM_COLS,
            num_rows: NUM_ROWS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub max_depth: usize,
    pub max_range_cells: usize,
    pub cycle_policy: CyclePolicy,
    pub grid: GridBounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
            cycle_policy: CyclePolicy::default(),
            grid: GridBounds::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}
