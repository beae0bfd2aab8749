//! Editor tuning knobs.

use serde::{Deserialize, Serialize};

/// Configuration for an [`EditorSession`](crate::session::EditorSession).
///
/// The nesting limit is not here: it is `pb_core::MAX_NESTING_DEPTH`, shared
/// by the tree store and the placement resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo depth. `None` keeps every snapshot.
    pub history_limit: Option<usize>,
    /// Height in px of the top/bottom bands of a container that mean
    /// "insert beside" rather than "nest inside". Capped at a quarter of the
    /// container's height.
    pub edge_band: f64,
    /// Mouse travel in px before a press becomes a drag.
    pub activation_distance: f64,
    /// Touch hold time in ms before a press becomes a drag.
    pub touch_delay_ms: u64,
    /// Touch travel in px allowed during the hold.
    pub touch_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            edge_band: 8.0,
            activation_distance: 8.0,
            touch_delay_ms: 100,
            touch_tolerance: 5.0,
        }
    }
}
