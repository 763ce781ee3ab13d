use std::path::Path;

use wirelay::catalog::standard_logic;
use wirelay::scene::{instantiate, parse_scene};
use wirelay::{CircuitEditor, Config, NetId, Rect, Vec2};

fn route_fixture(path: &Path) -> (CircuitEditor, Vec<NetId>) {
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    let scene = parse_scene(&input).expect("parse failed");
    let mut editor = CircuitEditor::new(standard_logic(), Config::default());
    let nets = instantiate(&scene, &mut editor).expect("instantiate failed");
    editor.route().expect("route failed");
    (editor, nets)
}

fn strictly_inside(rect: &Rect, x: f32, y: f32) -> bool {
    x > rect.min.x && x < rect.max.x && y > rect.min.y && y < rect.max.y
}

fn assert_routed_invariants(editor: &CircuitEditor, nets: &[NetId], fixture: &str) {
    let bodies: Vec<Rect> = editor.router().nodes().map(|(_, body)| body).collect();

    for &net in nets {
        let path = editor.router().edge_path(net).expect("missing path");
        assert!(path.len() >= 2, "{fixture}: {net:?} path too short");

        // Endpoint fidelity: first and last points sit exactly on the ports.
        let view = editor.view.net(net);
        let from = editor.router().port_position(view.from).expect("from port");
        let to = editor.router().port_position(view.to).expect("to port");
        assert_eq!(path[0], (from.x, from.y), "{fixture}: {net:?} start");
        assert_eq!(
            path[path.len() - 1],
            (to.x, to.y),
            "{fixture}: {net:?} end"
        );

        // Orthogonality: every segment is axis-aligned.
        for pair in path.windows(2) {
            let (x1, y1) = pair[0];
            let (x2, y2) = pair[1];
            assert!(
                (x1 - x2).abs() < 1e-4 || (y1 - y2).abs() < 1e-4,
                "{fixture}: {net:?} diagonal segment ({x1},{y1}) -> ({x2},{y2})"
            );
        }

        // Obstacle avoidance: interior points stay out of every body.
        for &(x, y) in &path[1..path.len() - 1] {
            for body in &bodies {
                assert!(
                    !strictly_inside(body, x, y),
                    "{fixture}: {net:?} point ({x}, {y}) inside {body:?}"
                );
            }
        }

        // Vertex reconciliation: interior vertex count matches the path.
        let expected = path.len().saturating_sub(2);
        if path.len() > 2 {
            assert_eq!(
                view.vertices.len(),
                expected,
                "{fixture}: {net:?} vertex count"
            );
            for (index, vertex) in view.vertices.iter().enumerate() {
                assert_eq!(
                    (vertex.x, vertex.y),
                    path[index + 1],
                    "{fixture}: {net:?} vertex {index}"
                );
            }
        }
    }
}

#[test]
fn route_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "pair.wsc",
        "chain.wsc",
        "wall.wsc",
        "fanout.wsc",
        "feedback.wsc",
        "stack.wsc",
    ];

    for fixture in fixtures {
        let path = root.join(fixture);
        assert!(path.exists(), "fixture missing: {fixture}");
        let (editor, nets) = route_fixture(&path);
        assert!(!nets.is_empty(), "{fixture}: no nets routed");
        assert_routed_invariants(&editor, &nets, fixture);
    }
}

#[test]
fn routing_twice_is_byte_identical() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    for fixture in ["chain.wsc", "wall.wsc", "fanout.wsc", "feedback.wsc"] {
        let (mut editor, nets) = route_fixture(&root.join(fixture));
        let first: Vec<Vec<(f32, f32)>> = nets
            .iter()
            .map(|&net| editor.router().edge_path(net).unwrap().to_vec())
            .collect();
        editor.route().expect("second route failed");
        let second: Vec<Vec<(f32, f32)>> = nets
            .iter()
            .map(|&net| editor.router().edge_path(net).unwrap().to_vec())
            .collect();
        assert_eq!(first, second, "{fixture}: routing is not deterministic");
    }
}

#[test]
fn moving_a_component_keeps_the_invariants() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    let (mut editor, nets) = route_fixture(&root.join("chain.wsc"));

    // Nudge the second component around a few times, rerouting after each
    // move, the way a drag gesture does once per frame.
    let target = editor.router().nodes().nth(1).map(|(id, _)| id).unwrap();
    for step in 0..4 {
        let delta = Vec2::new(7.0, if step % 2 == 0 { 11.0 } else { -5.0 });
        editor
            .router_mut()
            .move_node(target, delta.x, delta.y)
            .expect("move failed");
        editor.route().expect("route failed");
        assert_routed_invariants(&editor, &nets, "chain.wsc (moved)");
    }
}
