use serde::{Deserialize, Serialize};

/// Visual metrics the editor core needs for hit-testing and default
/// component sizing. Colors and fonts live with the renderer, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Component body width in world units.
    pub component_width: f32,
    /// Vertical pitch between port rows.
    pub port_pitch: f32,
    /// Vertical margin above the first and below the last port row.
    pub port_margin: f32,
    /// Side length of a port's square hit box.
    pub port_width: f32,
}

impl Theme {
    pub fn schematic_default() -> Self {
        Self {
            component_width: 40.0,
            port_pitch: 20.0,
            port_margin: 10.0,
            port_width: 7.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::schematic_default()
    }
}
