use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use wirelay::catalog::standard_logic;
use wirelay::{
    Avoider, CircuitEditor, ComponentId, Config, NetId, PortId, PortSide, RouterConfig, Vec2,
};

/// Grid of inverters chained along each row, with the row ends linked to
/// the next row's start so every pass routes a long snake of nets.
fn grid_editor(cols: usize, rows: usize) -> CircuitEditor {
    let mut editor = CircuitEditor::new(standard_logic(), Config::default());
    let not = editor.view.find_desc("NOT").expect("NOT in catalog");
    let mut ids = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let position = Vec2::new(col as f32 * 120.0, row as f32 * 90.0);
            ids.push(editor.add_component(not, position).expect("placement failed"));
        }
    }
    for row in 0..rows {
        for col in 0..cols - 1 {
            let a = ids[row * cols + col];
            let b = ids[row * cols + col + 1];
            let from = editor.view.find_port(a, "y").unwrap();
            let to = editor.view.find_port(b, "a").unwrap();
            editor.add_net(from, to).expect("net failed");
        }
    }
    for row in 0..rows - 1 {
        let a = ids[row * cols + cols - 1];
        let b = ids[(row + 1) * cols];
        let from = editor.view.find_port(a, "y").unwrap();
        let to = editor.view.find_port(b, "a").unwrap();
        editor.add_net(from, to).expect("net failed");
    }
    editor
}

/// Raw avoider with a diagonal chain of obstacles, for incremental
/// move-then-reroute frames without the editor on top.
fn chain_avoider(count: usize) -> Avoider {
    let mut avoider = Avoider::new(RouterConfig::default());
    for i in 0..count {
        let id = ComponentId(i as u32);
        let x = i as f32 * 110.0;
        let y = (i % 3) as f32 * 70.0;
        avoider.add_node(id, x, y, 40.0, 40.0).expect("node failed");
        avoider
            .add_port(PortId(i as u32 * 2), id, PortSide::Left, x, y + 20.0)
            .expect("port failed");
        avoider
            .add_port(PortId(i as u32 * 2 + 1), id, PortSide::Right, x + 40.0, y + 20.0)
            .expect("port failed");
    }
    for i in 0..count - 1 {
        avoider
            .add_edge(
                NetId(i as u32),
                ComponentId(i as u32),
                PortId(i as u32 * 2 + 1),
                ComponentId(i as u32 + 1),
                PortId((i as u32 + 1) * 2),
            )
            .expect("edge failed");
    }
    avoider
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_full_pass");
    for (cols, rows) in [(4usize, 3usize), (8, 6), (12, 8)] {
        let name = format!("grid_{}x{}", cols, rows);
        let mut editor = grid_editor(cols, rows);
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                editor.route().expect("route failed");
                black_box(editor.router().edge_count());
            });
        });
    }
    group.finish();
}

fn bench_drag_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_drag_frame");
    for count in [8usize, 24, 48] {
        let name = format!("chain_{}", count);
        let mut avoider = chain_avoider(count);
        let mut flip = false;
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                // one dragged component per frame, like MoveSelection
                let delta = if flip { 4.0 } else { -4.0 };
                flip = !flip;
                avoider
                    .move_node(ComponentId(0), delta, 0.0)
                    .expect("move failed");
                avoider.route();
                black_box(avoider.edge_count());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_full_pass, bench_drag_frame
);
criterion_main!(benches);
