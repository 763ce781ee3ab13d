//! Line-oriented schematic description format used by the CLI and the
//! integration suite. Two directives:
//!
//! ```text
//! # comment
//! component U1 AND at 20 40
//! net N1 U1.y U2.a
//! ```
//!
//! Coordinates are the component's top-left corner in world units; ports
//! are referenced as `<component>.<port>` using catalog port names.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::editor::CircuitEditor;
use crate::geom::Vec2;
use crate::id::{ComponentId, NetId, PortId};

static COMPONENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^component\s+(\w+)\s+(\w+)\s+at\s+(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)$")
        .unwrap()
});
static NET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^net\s+(\w+)\s+(\w+)\.(\w+)\s+(\w+)\.(\w+)$").unwrap());

#[derive(Debug, Clone)]
pub struct SceneComponent {
    pub name: String,
    pub kind: String,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct PortRef {
    pub component: String,
    pub port: String,
}

#[derive(Debug, Clone)]
pub struct SceneNet {
    pub name: String,
    pub from: PortRef,
    pub to: PortRef,
}

#[derive(Debug, Default)]
pub struct Scene {
    pub components: Vec<SceneComponent>,
    pub nets: Vec<SceneNet>,
}

pub fn parse_scene(input: &str) -> Result<Scene> {
    let mut scene = Scene::default();
    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim();
        let line_no = index + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(caps) = COMPONENT_RE.captures(line) {
            let name = caps[1].to_string();
            if scene.components.iter().any(|c| c.name == name) {
                bail!("line {line_no}: duplicate component name {name}");
            }
            let x: f32 = caps[3].parse()?;
            let y: f32 = caps[4].parse()?;
            scene.components.push(SceneComponent {
                name,
                kind: caps[2].to_string(),
                position: Vec2::new(x, y),
            });
        } else if let Some(caps) = NET_RE.captures(line) {
            let name = caps[1].to_string();
            if scene.nets.iter().any(|n| n.name == name) {
                bail!("line {line_no}: duplicate net name {name}");
            }
            scene.nets.push(SceneNet {
                name,
                from: PortRef {
                    component: caps[2].to_string(),
                    port: caps[3].to_string(),
                },
                to: PortRef {
                    component: caps[4].to_string(),
                    port: caps[5].to_string(),
                },
            });
        } else {
            bail!("line {line_no}: unrecognized directive: {line}");
        }
    }
    Ok(scene)
}

/// Places every component and net of `scene` into `editor`, resolving
/// component types against the editor's catalog and port references
/// against descriptor port names. Returns the resulting net identities in
/// scene order.
pub fn instantiate(scene: &Scene, editor: &mut CircuitEditor) -> Result<Vec<NetId>> {
    let mut by_name: HashMap<&str, ComponentId> = HashMap::new();
    for component in &scene.components {
        let desc = editor
            .view
            .find_desc(&component.kind)
            .ok_or_else(|| anyhow!("unknown component type {}", component.kind))?;
        let id = editor.add_component(desc, component.position)?;
        by_name.insert(component.name.as_str(), id);
    }

    let mut nets = Vec::with_capacity(scene.nets.len());
    for net in &scene.nets {
        let resolve = |port: &PortRef| -> Result<PortId> {
            let owner = by_name
                .get(port.component.as_str())
                .copied()
                .ok_or_else(|| {
                    anyhow!("net {} references unknown component {}", net.name, port.component)
                })?;
            editor.view.find_port(owner, &port.port).ok_or_else(|| {
                anyhow!(
                    "net {} references unknown port {}.{}",
                    net.name,
                    port.component,
                    port.port
                )
            })
        };
        let from = resolve(&net.from)?;
        let to = resolve(&net.to)?;
        nets.push(editor.add_net(from, to)?);
    }
    Ok(nets)
}
