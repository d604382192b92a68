use crate::history::DEFAULT_DEPTH;
use crate::math::{DEFAULT_GRID, DEFAULT_TOLERANCE};

/// Tunables shared by every engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Snap pitch of the drawing grid.
    pub grid: i64,
    /// Radius within which endpoints and pins are coincident.
    pub tolerance: i64,
    /// Pin-name suffix marking a global net, e.g. `vdd!`.
    pub global_suffix: String,
    /// Prefix of generated default net names.
    pub net_prefix: String,
    /// Maximum number of undo entries.
    pub history_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: DEFAULT_GRID,
            tolerance: DEFAULT_TOLERANCE,
            global_suffix: "!".into(),
            net_prefix: "net".into(),
            history_depth: DEFAULT_DEPTH,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_grid(mut self, grid: i64) -> Self {
        self.grid = grid;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: i64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_global_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.global_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_net_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.net_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }
}
