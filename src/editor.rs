//! Direct-manipulation layer: consumes an `InputState` snapshot each frame,
//! drives selection / drag / wire-creation gestures through a fixed-point
//! state machine, and keeps the routing graph and the view model in sync.

use crate::catalog::{ComponentDesc, PortDirection};
use crate::config::{Config, EditorConfig};
use crate::geom::{Rect, Vec2};
use crate::id::{ComponentId, DescId, NetId, PortId};
use crate::input::{InputState, Key};
use crate::router::{Avoider, GraphError, PortSide};
use crate::view::ViewModel;

/// Most path points accepted back from the router per net per pass.
/// Longer paths are truncated; a visual artifact, never corruption.
const MAX_PATH_POINTS: usize = 512;

/// Pointer gesture state. `Up` is the rest state; every other state is
/// part of an in-flight gesture. `ConnectPort` and `FloatingWire` are
/// momentary completion markers for a wire gesture (landed on a port vs.
/// dropped in space); the embedding application reads them before the
/// next frame returns the machine to `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerState {
    Up,
    Down,
    Click,
    Deselect,
    SelectArea,
    SelectOne,
    MoveSelection,
    ClickPort,
    DragWiring,
    ClickWiring,
    ConnectPort,
    FloatingWire,
}

/// Input predicates the transition function sees. `down`, `pressed`,
/// `over_port` and `over_component` are fixed for the frame; the rest
/// depend on view state and are recomputed between settling iterations.
#[derive(Debug, Clone, Copy)]
struct Gates {
    down: bool,
    pressed: bool,
    over_port: bool,
    over_component: bool,
    moved: bool,
    selected: bool,
    in_selection: bool,
}

/// Pure transition step. No actions here; entry/exit actions live with
/// the settling loop so this stays trivially exhaustive and testable.
fn next_state(state: PointerState, g: &Gates) -> PointerState {
    use PointerState::*;
    match state {
        Up => {
            if !g.down {
                Up
            } else if g.in_selection {
                MoveSelection
            } else if g.over_port {
                ClickPort
            } else if g.over_component {
                SelectOne
            } else {
                Down
            }
        }
        Down => {
            if !g.down {
                if g.selected { Deselect } else { Click }
            } else if g.moved && !g.selected {
                SelectArea
            } else {
                Down
            }
        }
        SelectOne => {
            if !g.down {
                Up
            } else if g.moved {
                MoveSelection
            } else {
                SelectOne
            }
        }
        ClickPort => {
            // Waits across the release; a second press arms click-wiring,
            // dragging away instead starts drag-wiring.
            if g.pressed {
                ClickWiring
            } else if g.moved {
                DragWiring
            } else {
                ClickPort
            }
        }
        DragWiring => {
            if g.down {
                DragWiring
            } else if g.over_port {
                ConnectPort
            } else {
                FloatingWire
            }
        }
        ClickWiring => {
            if g.down {
                if g.over_port { ConnectPort } else { FloatingWire }
            } else {
                ClickWiring
            }
        }
        Click | Deselect | SelectArea | MoveSelection | ConnectPort | FloatingWire => {
            if !g.down { Up } else { state }
        }
    }
}

/// The editing session: routing graph, view model, input snapshot and the
/// gesture state machine, ticked once per rendered frame.
pub struct CircuitEditor {
    pub view: ViewModel,
    pub input: InputState,
    router: Avoider,
    config: EditorConfig,
    state: PointerState,
    down_start: Vec2,
    prev_down: bool,
}

impl CircuitEditor {
    pub fn new(descs: Vec<ComponentDesc>, config: Config) -> Self {
        Self {
            view: ViewModel::new(descs, config.theme),
            input: InputState::default(),
            router: Avoider::new(config.router),
            config: config.editor,
            state: PointerState::Up,
            down_start: Vec2::ZERO,
            prev_down: false,
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn router(&self) -> &Avoider {
        &self.router
    }

    /// Mutable access to the routing graph for batched edits outside a
    /// gesture (the graph owns all positions, so this cannot desync the
    /// view). Call `route()` afterwards to refresh paths and vertices.
    pub fn router_mut(&mut self) -> &mut Avoider {
        &mut self.router
    }

    /// Pointer position in world coordinates under the current transform.
    pub fn world_mouse(&self) -> Vec2 {
        (self.input.mouse_pos - self.view.pan) / self.view.zoom
    }

    pub fn component_box(&self, id: ComponentId) -> Result<Rect, GraphError> {
        self.router.node_box(id)
    }

    /// Places a component of type `desc` with its top-left corner at
    /// `position`: one view record, one obstacle, and one routed port per
    /// descriptor port (inputs attach on the left side, the rest on the
    /// right).
    pub fn add_component(
        &mut self,
        desc: DescId,
        position: Vec2,
    ) -> Result<ComponentId, GraphError> {
        let id = self.view.add_component(desc);
        let component = self.view.component(id);
        let (width, height) = (component.width, component.height);
        self.router.add_node(id, position.x, position.y, width, height)?;
        let (start, end) = self.view.port_range(id);
        for slot in start..end {
            let port_id = PortId(slot);
            let port = self.view.port(port_id);
            let side = if port.direction == PortDirection::In {
                PortSide::Left
            } else {
                PortSide::Right
            };
            let world = position + port.offset;
            self.router.add_port(port_id, id, side, world.x, world.y)?;
        }
        Ok(id)
    }

    /// Connects two ports with a new net and registers the matching edge.
    pub fn add_net(&mut self, from: PortId, to: PortId) -> Result<NetId, GraphError> {
        let from_owner = self.router.port_owner(from)?;
        let to_owner = self.router.port_owner(to)?;
        let id = NetId(self.view.net_count() as u32);
        self.router.add_edge(id, from_owner, from, to_owner, to)?;
        let view_id = self.view.add_net(from, to);
        debug_assert_eq!(view_id, id);
        Ok(id)
    }

    /// One routing pass plus path synchronization: every net's interior
    /// vertex list is resized to (path point count − 2) and overwritten
    /// from the freshly routed points. Paths of two points or fewer have
    /// nothing to synchronize.
    pub fn route(&mut self) -> Result<(), GraphError> {
        self.router.route();

        let mut coords = [0.0f32; MAX_PATH_POINTS * 2];
        for index in 0..self.view.net_count() {
            let net = NetId(index as u32);
            let written = self.router.copy_edge_path(net, &mut coords)?;
            let count = written / 2;
            if count <= 2 {
                continue;
            }

            let mut current = self.view.net(net).vertices.len() + 2;
            while current < count {
                self.view.add_vertex(net, Vec2::ZERO);
                current += 1;
            }
            while current > count && current > 2 {
                self.view.rem_vertex(net);
                current -= 1;
            }
            for j in 0..count - 2 {
                let point = Vec2::new(coords[(j + 1) * 2], coords[(j + 1) * 2 + 1]);
                self.view.set_vertex(net, j, point);
            }
        }
        Ok(())
    }

    /// One frame: keyboard panning, wheel zoom, the hover pre-pass, then
    /// the gesture state machine with its continuous actions.
    pub fn update(&mut self) -> Result<(), GraphError> {
        self.apply_pan_keys();
        if self.input.scroll.y.abs() > 0.001 {
            self.apply_zoom();
        }
        self.update_hover()?;
        let world = self.world_mouse();
        self.pointer_state_machine(world)?;
        self.prev_down = self.input.primary_down;
        Ok(())
    }

    fn apply_pan_keys(&mut self) {
        let step = self.config.pan_speed * self.input.frame_duration * self.view.zoom;
        if self.input.keys.is_down(Key::W) {
            self.view.pan.y -= step;
        }
        if self.input.keys.is_down(Key::A) {
            self.view.pan.x -= step;
        }
        if self.input.keys.is_down(Key::S) {
            self.view.pan.y += step;
        }
        if self.input.keys.is_down(Key::D) {
            self.view.pan.x += step;
        }
    }

    /// Exponential zoom centred on the pointer: the world point under the
    /// cursor stays fixed while the scale changes around it.
    fn apply_zoom(&mut self) {
        self.view.zoom_exp = (self.view.zoom_exp + self.input.scroll.y * self.config.zoom_step)
            .clamp(-self.config.max_zoom_exp, self.config.max_zoom_exp);
        let old_zoom = self.view.zoom;
        let new_zoom = self.config.zoom_base.powf(self.view.zoom_exp);
        self.view.zoom = new_zoom;

        let original = (self.input.mouse_pos - self.view.pan) / old_zoom;
        let shifted = (self.input.mouse_pos - self.view.pan) / new_zoom;
        self.view.pan += (shifted - original) * new_zoom;
    }

    /// Hit-tests the pointer against every component body and port box.
    /// The last match in insertion order wins, which is stable because
    /// components are only ever appended.
    fn update_hover(&mut self) -> Result<(), GraphError> {
        self.view.hovered_component = None;
        self.view.hovered_port = None;

        let world = self.world_mouse();
        let probe = Rect::around(world, self.config.mouse_fudge);

        for index in 0..self.view.component_count() {
            let id = ComponentId(index as u32);
            let body = self.router.node_box(id)?;
            if body.intersects(&probe) {
                self.view.hovered_component = Some(id);
            }
            let (start, end) = self.view.port_range(id);
            for slot in start..end {
                let port_id = PortId(slot);
                let center = self.router.port_position(port_id)?;
                let hit = Rect::around(center, self.view.theme.port_width / 2.0);
                if hit.intersects(&probe) {
                    self.view.hovered_port = Some(port_id);
                }
            }
        }
        Ok(())
    }

    fn in_selection(&self, world: Vec2) -> Result<bool, GraphError> {
        if self.view.selection_box.has_area() && self.view.selection_box.contains(world) {
            return Ok(true);
        }
        for &id in &self.view.selected {
            if self.router.node_box(id)?.contains(world) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn pointer_state_machine(&mut self, world: Vec2) -> Result<(), GraphError> {
        let down = self.input.primary_down;
        let over_port = self.view.hovered_port.is_some();
        let over_component = self.view.hovered_component.is_some();
        // Rising edge of the primary button this frame. Consumed when a
        // transition leaves Up so one press cannot drive two gestures.
        let mut pressed = down && !self.prev_down;

        loop {
            let moved = down
                && (world - self.down_start).length()
                    > self.config.drag_threshold * self.view.zoom;
            let selected =
                !self.view.selected.is_empty() || self.view.selection_box.has_area();
            let in_selection = self.in_selection(world)?;
            let gates = Gates {
                down,
                pressed,
                over_port,
                over_component,
                moved,
                selected,
                in_selection,
            };
            let next = next_state(self.state, &gates);
            if next == self.state {
                break;
            }

            // exit actions
            if self.state == PointerState::Up {
                pressed = false;
            }

            // entry actions
            match next {
                PointerState::Deselect => {
                    self.view.selected.clear();
                    self.view.selection_box = Rect::ZERO;
                }
                PointerState::SelectOne => {
                    self.view.selected.clear();
                    if let Some(id) = self.view.hovered_component {
                        self.view.selected.push(id);
                    }
                }
                _ => {}
            }

            self.state = next;

            // Completion markers hold for the rest of the frame so the
            // application can read which way the wire gesture ended; they
            // resolve to Up on the next tick.
            if matches!(
                self.state,
                PointerState::ConnectPort | PointerState::FloatingWire
            ) {
                break;
            }
        }

        // continuous per-frame actions
        match self.state {
            PointerState::Up => {
                // Rest state tracks the pointer so the next press measures
                // its drag from where the gesture actually began.
                if !down {
                    self.down_start = world;
                }
            }
            PointerState::MoveSelection => {
                let delta = world - self.down_start;
                for i in 0..self.view.selected.len() {
                    let id = self.view.selected[i];
                    self.router.move_node(id, delta.x, delta.y)?;
                }
                self.route()?;
                self.view.selection_box = self.view.selection_box.translate(delta);
                self.down_start = world;
            }
            PointerState::SelectArea => {
                self.view.selection_box = Rect::from_corners(self.down_start, world);
                self.view.selected.clear();
                for index in 0..self.view.component_count() {
                    let id = ComponentId(index as u32);
                    if self.router.node_box(id)?.intersects(&self.view.selection_box) {
                        self.view.selected.push(id);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_logic;

    fn editor() -> CircuitEditor {
        CircuitEditor::new(standard_logic(), Config::default())
    }

    fn frame(editor: &mut CircuitEditor, mouse: Vec2, down: bool) {
        editor.input.mouse_pos = mouse;
        editor.input.primary_down = down;
        editor.input.scroll = Vec2::ZERO;
        editor.input.frame_duration = 1.0 / 60.0;
        editor.update().expect("update failed");
    }

    fn place_not(editor: &mut CircuitEditor, position: Vec2) -> ComponentId {
        let not = editor.view.find_desc("NOT").expect("NOT in catalog");
        editor.add_component(not, position).expect("placement failed")
    }

    #[test]
    fn every_state_and_gate_combination_has_one_next_state() {
        use PointerState::*;
        let states = [
            Up, Down, Click, Deselect, SelectArea, SelectOne, MoveSelection, ClickPort,
            DragWiring, ClickWiring, ConnectPort, FloatingWire,
        ];
        for &state in &states {
            for bits in 0..128u32 {
                let gates = Gates {
                    down: bits & 1 != 0,
                    pressed: bits & 2 != 0,
                    over_port: bits & 4 != 0,
                    over_component: bits & 8 != 0,
                    moved: bits & 16 != 0,
                    selected: bits & 32 != 0,
                    in_selection: bits & 64 != 0,
                };
                // next_state is a total function; it must also settle: from
                // any state, repeated application under fixed gates reaches
                // a fixed point within the state count.
                let mut current = state;
                for _ in 0..states.len() {
                    let next = next_state(current, &gates);
                    if next == current {
                        break;
                    }
                    current = next;
                }
                assert_eq!(current, next_state(current, &gates));
            }
        }
    }

    #[test]
    fn released_states_fall_back_to_up() {
        use PointerState::*;
        let released = Gates {
            down: false,
            pressed: false,
            over_port: false,
            over_component: false,
            moved: false,
            selected: false,
            in_selection: false,
        };
        for &state in &[
            Down, Click, Deselect, SelectArea, SelectOne, MoveSelection, DragWiring,
            ConnectPort, FloatingWire,
        ] {
            let mut current = state;
            for _ in 0..3 {
                current = next_state(current, &released);
            }
            assert_eq!(current, Up, "{state:?} did not settle to Up");
        }
    }

    #[test]
    fn press_and_drag_moves_a_component() {
        let mut editor = editor();
        let id = place_not(&mut editor, Vec2::ZERO);
        editor.route().unwrap();

        // hover frame latches the gesture anchor away from both ports
        frame(&mut editor, Vec2::new(20.0, 10.0), false);
        assert_eq!(editor.state(), PointerState::Up);
        assert_eq!(editor.view.hovered_component, Some(id));

        // press + 20 units of travel in one frame: select and start moving
        frame(&mut editor, Vec2::new(40.0, 10.0), true);
        assert_eq!(editor.state(), PointerState::MoveSelection);
        assert_eq!(editor.view.selected, vec![id]);
        let body = editor.component_box(id).unwrap();
        assert_eq!(body.min, Vec2::new(20.0, 0.0));
        // ports moved with their obstacle
        let (start, _) = editor.view.port_range(id);
        assert_eq!(
            editor.router().port_position(PortId(start)).unwrap(),
            Vec2::new(20.0, 20.0)
        );

        frame(&mut editor, Vec2::new(40.0, 10.0), false);
        assert_eq!(editor.state(), PointerState::Up);
    }

    #[test]
    fn short_press_selects_without_moving() {
        let mut editor = editor();
        let id = place_not(&mut editor, Vec2::ZERO);

        frame(&mut editor, Vec2::new(20.0, 10.0), false);
        frame(&mut editor, Vec2::new(22.0, 10.0), true);
        assert_eq!(editor.state(), PointerState::SelectOne);
        assert_eq!(editor.view.selected, vec![id]);
        let body = editor.component_box(id).unwrap();
        assert_eq!(body.min, Vec2::ZERO);
    }

    #[test]
    fn empty_space_drag_selects_by_area() {
        let mut editor = editor();
        let near = place_not(&mut editor, Vec2::ZERO);
        let far = place_not(&mut editor, Vec2::new(200.0, 0.0));
        let away = place_not(&mut editor, Vec2::new(0.0, 300.0));

        frame(&mut editor, Vec2::new(300.0, 200.0), false);
        frame(&mut editor, Vec2::new(300.0, 200.0), true);
        assert_eq!(editor.state(), PointerState::Down);

        frame(&mut editor, Vec2::new(20.0, 30.0), true);
        assert_eq!(editor.state(), PointerState::SelectArea);
        assert!(editor.view.is_selected(near));
        assert!(editor.view.is_selected(far));
        assert!(!editor.view.is_selected(away));

        frame(&mut editor, Vec2::new(20.0, 30.0), false);
        assert_eq!(editor.state(), PointerState::Up);
        assert!(editor.view.is_selected(near));
        assert!(editor.view.is_selected(far));
    }

    #[test]
    fn deselect_clears_selection_on_the_next_click() {
        let mut editor = editor();
        place_not(&mut editor, Vec2::ZERO);

        frame(&mut editor, Vec2::new(300.0, 200.0), false);
        frame(&mut editor, Vec2::new(300.0, 200.0), true);
        frame(&mut editor, Vec2::new(20.0, 30.0), true);
        frame(&mut editor, Vec2::new(20.0, 30.0), false);
        assert!(!editor.view.selected.is_empty());

        frame(&mut editor, Vec2::new(400.0, 400.0), false);
        frame(&mut editor, Vec2::new(400.0, 400.0), true);
        assert_eq!(editor.state(), PointerState::Down);
        frame(&mut editor, Vec2::new(400.0, 400.0), false);
        assert_eq!(editor.state(), PointerState::Up);
        assert!(editor.view.selected.is_empty());
        assert!(!editor.view.selection_box.has_area());
    }

    #[test]
    fn drag_from_port_to_port_connects() {
        let mut editor = editor();
        place_not(&mut editor, Vec2::ZERO);
        let right = place_not(&mut editor, Vec2::new(100.0, 0.0));
        let (right_start, _) = editor.view.port_range(right);

        // press on the left component's output port
        frame(&mut editor, Vec2::new(40.0, 20.0), false);
        frame(&mut editor, Vec2::new(40.0, 20.0), true);
        assert_eq!(editor.state(), PointerState::ClickPort);

        // drag away: wiring in progress
        frame(&mut editor, Vec2::new(70.0, 20.0), true);
        assert_eq!(editor.state(), PointerState::DragWiring);

        // release over the right component's input port
        frame(&mut editor, Vec2::new(100.0, 20.0), false);
        assert_eq!(editor.state(), PointerState::ConnectPort);
        assert_eq!(editor.view.hovered_port, Some(PortId(right_start)));

        frame(&mut editor, Vec2::new(100.0, 20.0), false);
        assert_eq!(editor.state(), PointerState::Up);
    }

    #[test]
    fn drag_released_in_space_floats_the_wire() {
        let mut editor = editor();
        place_not(&mut editor, Vec2::ZERO);

        frame(&mut editor, Vec2::new(40.0, 20.0), false);
        frame(&mut editor, Vec2::new(40.0, 20.0), true);
        assert_eq!(editor.state(), PointerState::ClickPort);
        frame(&mut editor, Vec2::new(80.0, 60.0), true);
        assert_eq!(editor.state(), PointerState::DragWiring);
        frame(&mut editor, Vec2::new(80.0, 60.0), false);
        assert_eq!(editor.state(), PointerState::FloatingWire);
        frame(&mut editor, Vec2::new(80.0, 60.0), false);
        assert_eq!(editor.state(), PointerState::Up);
    }

    #[test]
    fn click_then_click_wires_through_click_wiring() {
        let mut editor = editor();
        place_not(&mut editor, Vec2::ZERO);

        frame(&mut editor, Vec2::new(40.0, 20.0), false);
        frame(&mut editor, Vec2::new(40.0, 20.0), true);
        assert_eq!(editor.state(), PointerState::ClickPort);
        // release without travelling: still armed
        frame(&mut editor, Vec2::new(40.0, 20.0), false);
        assert_eq!(editor.state(), PointerState::ClickPort);
        // second press over the same port completes immediately
        frame(&mut editor, Vec2::new(40.0, 20.0), true);
        assert_eq!(editor.state(), PointerState::ConnectPort);
        frame(&mut editor, Vec2::new(40.0, 20.0), false);
        assert_eq!(editor.state(), PointerState::Up);
    }

    #[test]
    fn moving_a_component_reroutes_and_syncs_vertices() {
        let mut editor = editor();
        let left = place_not(&mut editor, Vec2::ZERO);
        let right = place_not(&mut editor, Vec2::new(100.0, 40.0));
        let from = editor.view.find_port(left, "y").unwrap();
        let to = editor.view.find_port(right, "a").unwrap();
        let net = editor.add_net(from, to).unwrap();
        editor.route().unwrap();

        let path_len = editor.router().edge_path(net).unwrap().len();
        let vertices = editor.view.net(net).vertices.len();
        if path_len > 2 {
            assert_eq!(vertices, path_len - 2);
        } else {
            assert_eq!(vertices, 0);
        }

        // drag the right component further away and check reconciliation
        frame(&mut editor, Vec2::new(120.0, 50.0), false);
        frame(&mut editor, Vec2::new(120.0, 50.0), true);
        assert_eq!(editor.state(), PointerState::SelectOne);
        frame(&mut editor, Vec2::new(160.0, 90.0), true);
        assert_eq!(editor.state(), PointerState::MoveSelection);
        let path_len = editor.router().edge_path(net).unwrap().len();
        if path_len > 2 {
            assert_eq!(editor.view.net(net).vertices.len(), path_len - 2);
            let path = editor.router().edge_path(net).unwrap();
            for (index, vertex) in editor.view.net(net).vertices.iter().enumerate() {
                assert_eq!((vertex.x, vertex.y), path[index + 1]);
            }
        }
    }

    #[test]
    fn zoom_keeps_the_world_point_under_the_cursor() {
        let mut editor = editor();
        editor.input.mouse_pos = Vec2::new(100.0, 80.0);
        let before = editor.world_mouse();
        editor.input.scroll = Vec2::new(0.0, 2.0);
        editor.update().unwrap();
        assert!(editor.view.zoom > 1.0);
        let after = editor.world_mouse();
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn wasd_pans_the_view() {
        let mut editor = editor();
        editor.input.keys.press(Key::D);
        editor.input.frame_duration = 0.1;
        editor.update().unwrap();
        assert!(editor.view.pan.x > 0.0);
        assert_eq!(editor.view.pan.y, 0.0);
    }
}
