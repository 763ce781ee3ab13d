//! JSON snapshot of a routed diagram: component boxes, port positions and
//! the routed polyline of every net. This is the CLI's output format and
//! doubles as a debugging probe for embedders.

use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::editor::CircuitEditor;
use crate::id::{ComponentId, NetId, PortId};
use crate::router::GraphError;

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub components: Vec<ComponentDump>,
    pub nets: Vec<NetDump>,
}

#[derive(Debug, Serialize)]
pub struct ComponentDump {
    pub id: u32,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub ports: Vec<PortDump>,
}

#[derive(Debug, Serialize)]
pub struct PortDump {
    pub id: u32,
    pub name: String,
    pub direction: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct NetDump {
    pub id: u32,
    pub from: u32,
    pub to: u32,
    pub points: Vec<[f32; 2]>,
}

impl RouteDump {
    pub fn from_editor(editor: &CircuitEditor) -> Result<Self, GraphError> {
        let mut components = Vec::with_capacity(editor.view.component_count());
        for index in 0..editor.view.component_count() {
            let id = ComponentId(index as u32);
            let view = editor.view.component(id);
            let desc = editor.view.desc(view.desc);
            let body = editor.component_box(id)?;
            let (start, end) = editor.view.port_range(id);
            let mut ports = Vec::with_capacity((end - start) as usize);
            for slot in start..end {
                let port_id = PortId(slot);
                let position = editor.router().port_position(port_id)?;
                let port = editor.view.port(port_id);
                ports.push(PortDump {
                    id: slot,
                    name: desc.ports[(slot - start) as usize].name.clone(),
                    direction: format!("{:?}", port.direction),
                    x: position.x,
                    y: position.y,
                });
            }
            components.push(ComponentDump {
                id: index as u32,
                kind: desc.name.clone(),
                x: body.min.x,
                y: body.min.y,
                width: body.width(),
                height: body.height(),
                ports,
            });
        }

        let mut nets = Vec::with_capacity(editor.view.net_count());
        for index in 0..editor.view.net_count() {
            let id = NetId(index as u32);
            let net = editor.view.net(id);
            let path = editor.router().edge_path(id)?;
            nets.push(NetDump {
                id: index as u32,
                from: net.from.0,
                to: net.to.0,
                points: path.iter().map(|&(x, y)| [x, y]).collect(),
            });
        }

        Ok(RouteDump { components, nets })
    }
}

pub fn dump_string(editor: &CircuitEditor) -> anyhow::Result<String> {
    let dump = RouteDump::from_editor(editor)?;
    Ok(serde_json::to_string_pretty(&dump)?)
}

pub fn write_route_dump(path: &Path, editor: &CircuitEditor) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = RouteDump::from_editor(editor)?;
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
