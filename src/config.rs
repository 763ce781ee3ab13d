use crate::theme::Theme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for the routing graph. Distances are world units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Clearance added around every obstacle body before routing.
    pub obstacle_pad: f32,
    /// How far a path steps off its port beyond the obstacle pad before it
    /// is allowed to turn.
    pub stub_length: f32,
    /// Step between candidate detour offsets.
    pub detour_step: f32,
    /// Number of detour offsets tried on each side of the centerline.
    pub detour_fan: usize,
    /// Routing grid cell size for the A* fallback.
    pub grid_cell: f32,
    /// Margin added around the obstacle bounding box when gridding.
    pub grid_margin: f32,
    /// Upper bound on grid size; beyond this the grid router is skipped.
    pub max_grid_cells: usize,
    /// Upper bound on A* node expansions per edge.
    pub max_steps: usize,
    /// Cost of a 90-degree turn, in multiples of one cell of travel.
    pub turn_penalty: f32,
    /// Cost multiplier for stepping onto a cell another path occupies.
    pub occupancy_weight: f32,
    /// Cell size of the occupancy map shared by all edges in one pass.
    pub occupancy_cell: f32,
    /// Disable to route with elbow candidates only (faster, uglier).
    pub enable_grid_router: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            obstacle_pad: 6.0,
            stub_length: 12.0,
            detour_step: 14.0,
            detour_fan: 6,
            grid_cell: 10.0,
            grid_margin: 60.0,
            max_grid_cells: 250_000,
            max_steps: 60_000,
            turn_penalty: 2.0,
            occupancy_weight: 0.5,
            occupancy_cell: 12.0,
            enable_grid_router: true,
        }
    }
}

/// Tuning knobs for the interaction layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// World-unit travel (scaled by zoom) before a press becomes a drag.
    pub drag_threshold: f32,
    /// Half-extent of the pointer probe box used for hit-testing.
    pub mouse_fudge: f32,
    /// Keyboard pan speed in screen units per second.
    pub pan_speed: f32,
    /// Zoom exponent change per wheel notch.
    pub zoom_step: f32,
    /// Base of the exponential zoom curve.
    pub zoom_base: f32,
    /// Clamp for the zoom exponent in both directions.
    pub max_zoom_exp: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 10.0,
            mouse_fudge: 1.5,
            pan_speed: 600.0,
            zoom_step: 0.5,
            zoom_base: 1.1,
            max_zoom_exp: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub router: RouterConfig,
    pub editor: EditorConfig,
}

/// Loads a config file, accepting strict JSON first and JSON5 as a
/// fallback so hand-edited files may carry comments and trailing commas.
/// `None` yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    if let Ok(config) = serde_json::from_str::<Config>(&raw) {
        return Ok(config);
    }
    json5::from_str::<Config>(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
