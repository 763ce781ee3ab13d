pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod editor;
pub mod geom;
pub mod id;
pub mod input;
pub mod route_dump;
pub mod router;
pub mod scene;
pub mod theme;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, EditorConfig, RouterConfig, load_config};
pub use editor::{CircuitEditor, PointerState};
pub use geom::{Rect, Vec2};
pub use id::{ComponentId, DescId, NetId, PortId};
pub use input::{InputState, Key};
pub use router::{Avoider, GraphError, PortSide};
pub use theme::Theme;
