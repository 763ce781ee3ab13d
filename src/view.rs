//! Screen-side model of the diagram: component and port records, nets with
//! their editable vertex lists, the selection set, hover results and the
//! pan/zoom transform.
//!
//! Positions are deliberately absent here. The routing graph is the single
//! source of truth for where a component and its ports sit; the view model
//! holds only identities and sizes, so the two can never drift apart.

use crate::catalog::{ComponentDesc, PortDirection};
use crate::geom::{Rect, Vec2};
use crate::id::{ComponentId, DescId, NetId, PortId};
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct ComponentView {
    pub desc: DescId,
    pub width: f32,
    pub height: f32,
    /// Contiguous slot range into the global port list.
    pub port_start: u32,
    pub port_end: u32,
}

#[derive(Debug, Clone)]
pub struct PortView {
    pub owner: ComponentId,
    pub direction: PortDirection,
    /// Attachment point relative to the component's top-left corner.
    pub offset: Vec2,
}

#[derive(Debug, Clone)]
pub struct NetView {
    pub from: PortId,
    pub to: PortId,
    /// Editable interior path points, excluding the two port endpoints.
    pub vertices: Vec<Vec2>,
}

#[derive(Debug)]
pub struct ViewModel {
    pub theme: Theme,
    descs: Vec<ComponentDesc>,
    components: Vec<ComponentView>,
    ports: Vec<PortView>,
    nets: Vec<NetView>,
    pub selected: Vec<ComponentId>,
    pub selection_box: Rect,
    pub hovered_component: Option<ComponentId>,
    pub hovered_port: Option<PortId>,
    pub pan: Vec2,
    pub zoom: f32,
    pub zoom_exp: f32,
}

impl ViewModel {
    pub fn new(descs: Vec<ComponentDesc>, theme: Theme) -> Self {
        Self {
            theme,
            descs,
            components: Vec::new(),
            ports: Vec::new(),
            nets: Vec::new(),
            selected: Vec::new(),
            selection_box: Rect::ZERO,
            hovered_component: None,
            hovered_port: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            zoom_exp: 0.0,
        }
    }

    pub fn desc(&self, id: DescId) -> &ComponentDesc {
        &self.descs[id.0]
    }

    pub fn find_desc(&self, name: &str) -> Option<DescId> {
        self.descs
            .iter()
            .position(|desc| desc.name == name)
            .map(DescId)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, id: ComponentId) -> &ComponentView {
        &self.components[id.0 as usize]
    }

    pub fn port(&self, id: PortId) -> &PortView {
        &self.ports[id.0 as usize]
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    pub fn net(&self, id: NetId) -> &NetView {
        &self.nets[id.0 as usize]
    }

    /// Creates the view record for a component of type `desc`: body sized
    /// from the theme and port rows pitched evenly down the body, inputs
    /// on the left edge, everything else on the right.
    pub fn add_component(&mut self, desc: DescId) -> ComponentId {
        let descriptor = self.descs[desc.0].clone();
        let rows = descriptor
            .input_count()
            .max(descriptor.output_count())
            .max(1);
        let width = self.theme.component_width;
        let height = rows as f32 * self.theme.port_pitch + 2.0 * self.theme.port_margin;

        let id = ComponentId(self.components.len() as u32);
        let port_start = self.ports.len() as u32;
        let input_count = descriptor.input_count();
        let output_count = descriptor.ports.len() - input_count;
        let mut input_row = 0usize;
        let mut output_row = 0usize;
        for port in &descriptor.ports {
            let (x, row, rows_on_side) = if port.direction == PortDirection::In {
                input_row += 1;
                (0.0, input_row - 1, input_count)
            } else {
                output_row += 1;
                (width, output_row - 1, output_count)
            };
            let y = height * (row as f32 + 1.0) / (rows_on_side as f32 + 1.0);
            self.ports.push(PortView {
                owner: id,
                direction: port.direction,
                offset: Vec2::new(x, y),
            });
        }
        self.components.push(ComponentView {
            desc,
            width,
            height,
            port_start,
            port_end: self.ports.len() as u32,
        });
        id
    }

    /// Slot range of a component's ports in the global port list.
    pub fn port_range(&self, id: ComponentId) -> (u32, u32) {
        let component = &self.components[id.0 as usize];
        (component.port_start, component.port_end)
    }

    /// Resolves a port by its descriptor name on the given component.
    pub fn find_port(&self, component: ComponentId, name: &str) -> Option<PortId> {
        let view = &self.components[component.0 as usize];
        let desc = &self.descs[view.desc.0];
        desc.ports
            .iter()
            .position(|port| port.name == name)
            .map(|index| PortId(view.port_start + index as u32))
    }

    pub fn add_net(&mut self, from: PortId, to: PortId) -> NetId {
        let id = NetId(self.nets.len() as u32);
        self.nets.push(NetView {
            from,
            to,
            vertices: Vec::new(),
        });
        id
    }

    pub fn add_vertex(&mut self, net: NetId, vertex: Vec2) {
        self.nets[net.0 as usize].vertices.push(vertex);
    }

    /// Removes the trailing interior vertex, if any.
    pub fn rem_vertex(&mut self, net: NetId) {
        self.nets[net.0 as usize].vertices.pop();
    }

    pub fn set_vertex(&mut self, net: NetId, index: usize, position: Vec2) {
        self.nets[net.0 as usize].vertices[index] = position;
    }

    pub fn is_selected(&self, id: ComponentId) -> bool {
        self.selected.contains(&id)
    }
}
