use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::RouterConfig;
use crate::geom::Rect;

use super::PortSide;
use super::occupancy::EdgeOccupancy;
use super::route::compress_path;

/// Integer cost multiplier so A* can use u32 costs with fractional cell
/// sizes.
const COST_SCALE: f32 = 1000.0;

/// Uniform grid over the padded obstacle set. A cell is blocked when its
/// center falls inside any padded obstacle; paths travel cell-center to
/// cell-center, which keeps every A* result axis-aligned by construction.
#[derive(Debug, Clone)]
pub(super) struct RoutingGrid {
    cell: f32,
    min_x: f32,
    min_y: f32,
    cols: i32,
    rows: i32,
    blocked: Vec<bool>,
}

impl RoutingGrid {
    pub(super) fn build(obstacles: &[Rect], config: &RouterConfig) -> Option<Self> {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for obstacle in obstacles {
            min_x = min_x.min(obstacle.min.x);
            min_y = min_y.min(obstacle.min.y);
            max_x = max_x.max(obstacle.max.x);
            max_y = max_y.max(obstacle.max.y);
        }
        if min_x == f32::MAX {
            return None;
        }
        min_x -= config.grid_margin;
        min_y -= config.grid_margin;
        max_x += config.grid_margin;
        max_y += config.grid_margin;
        let cell = config.grid_cell.max(4.0);
        let cols = ((max_x - min_x) / cell).ceil() as i32 + 1;
        let rows = ((max_y - min_y) / cell).ceil() as i32 + 1;
        if cols <= 1 || rows <= 1 {
            return None;
        }
        let total = (cols as usize).saturating_mul(rows as usize);
        if total > config.max_grid_cells {
            return None;
        }
        let mut blocked = vec![false; total];
        for obstacle in obstacles {
            let start_x = (((obstacle.min.x - min_x) / cell).floor().max(0.0)) as i32;
            let end_x = (((obstacle.max.x - min_x) / cell).floor()).min((cols - 1) as f32) as i32;
            let start_y = (((obstacle.min.y - min_y) / cell).floor().max(0.0)) as i32;
            let end_y = (((obstacle.max.y - min_y) / cell).floor()).min((rows - 1) as f32) as i32;
            for iy in start_y..=end_y {
                for ix in start_x..=end_x {
                    let cx = min_x + (ix as f32 + 0.5) * cell;
                    let cy = min_y + (iy as f32 + 0.5) * cell;
                    if cx >= obstacle.min.x
                        && cx <= obstacle.max.x
                        && cy >= obstacle.min.y
                        && cy <= obstacle.max.y
                    {
                        blocked[(iy * cols + ix) as usize] = true;
                    }
                }
            }
        }
        Some(Self {
            cell,
            min_x,
            min_y,
            cols,
            rows,
            blocked,
        })
    }

    fn cell_for_point(&self, x: f32, y: f32) -> Option<(i32, i32)> {
        let ix = ((x - self.min_x) / self.cell).floor() as i32;
        let iy = ((y - self.min_y) / self.cell).floor() as i32;
        if ix < 0 || iy < 0 || ix >= self.cols || iy >= self.rows {
            return None;
        }
        Some((ix, iy))
    }

    fn cell_center(&self, ix: i32, iy: i32) -> (f32, f32) {
        (
            self.min_x + (ix as f32 + 0.5) * self.cell,
            self.min_y + (iy as f32 + 0.5) * self.cell,
        )
    }

    fn is_blocked(&self, ix: i32, iy: i32) -> bool {
        self.blocked[(iy * self.cols + ix) as usize]
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct GridState {
    x: i32,
    y: i32,
    dir: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct GridEntry {
    est: u32,
    cost: u32,
    state: GridState,
}

// Total order: the heap must break cost ties on coordinates so routing
// stays byte-identical across runs.
impl Ord for GridEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .est
            .cmp(&self.est)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| self.state.y.cmp(&other.state.y))
            .then_with(|| self.state.x.cmp(&other.state.x))
            .then_with(|| self.state.dir.cmp(&other.state.dir))
    }
}

impl PartialOrd for GridEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over the grid from `start` to `end` (both already stubbed off their
/// ports). States carry the incoming direction so turns can be penalized;
/// start and end cells are exempt from blocking so a stub landing near a
/// padded obstacle can still enter the grid.
pub(super) fn route_on_grid(
    grid: &RoutingGrid,
    start: (f32, f32),
    end: (f32, f32),
    start_side: PortSide,
    end_side: PortSide,
    occupancy: &EdgeOccupancy,
    config: &RouterConfig,
) -> Option<Vec<(f32, f32)>> {
    let (start_ix, start_iy) = grid.cell_for_point(start.0, start.1)?;
    let (end_ix, end_iy) = grid.cell_for_point(end.0, end.1)?;
    if start_ix == end_ix && start_iy == end_iy {
        return Some(vec![start, end]);
    }

    let dirs: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
    let step_cost = (grid.cell * COST_SCALE).round() as u32;
    let turn_penalty = (config.turn_penalty * grid.cell * COST_SCALE).round() as u32;
    let occupancy_cost = (config.occupancy_weight * grid.cell * COST_SCALE).round() as u32;
    let max_steps = config.max_steps.max(1_000);

    let cols = grid.cols;
    let states = (cols * grid.rows * 4) as usize;
    let mut best_cost = vec![u32::MAX; states];
    let mut prev: Vec<Option<GridState>> = vec![None; states];
    let mut heap = BinaryHeap::new();

    for dir in 0..4u8 {
        let index = ((start_iy * cols + start_ix) as usize) * 4 + dir as usize;
        best_cost[index] = 0;
        heap.push(GridEntry {
            est: 0,
            cost: 0,
            state: GridState {
                x: start_ix,
                y: start_iy,
                dir,
            },
        });
    }

    let mut end_state: Option<GridState> = None;
    let mut expansions = 0usize;

    while let Some(entry) = heap.pop() {
        expansions += 1;
        if expansions > max_steps {
            break;
        }
        let GridEntry { cost, state, .. } = entry;
        let state_index = ((state.y * cols + state.x) as usize) * 4 + state.dir as usize;
        if cost != best_cost[state_index] {
            continue;
        }
        if state.x == end_ix && state.y == end_iy {
            end_state = Some(state);
            break;
        }
        for (dir_index, (dx, dy)) in dirs.iter().enumerate() {
            let nx = state.x + dx;
            let ny = state.y + dy;
            if nx < 0 || ny < 0 || nx >= cols || ny >= grid.rows {
                continue;
            }
            let at_endpoint = (nx == end_ix && ny == end_iy) || (nx == start_ix && ny == start_iy);
            if !at_endpoint && grid.is_blocked(nx, ny) {
                continue;
            }
            let mut next_cost = cost.saturating_add(step_cost);
            if state.dir != dir_index as u8 {
                next_cost = next_cost.saturating_add(turn_penalty);
            }
            let (cx, cy) = grid.cell_center(nx, ny);
            let weight = occupancy.weight_at(cx, cy) as u32;
            if weight > 0 {
                next_cost = next_cost.saturating_add(weight.saturating_mul(occupancy_cost));
            }
            let next_index = ((ny * cols + nx) as usize) * 4 + dir_index;
            if next_cost >= best_cost[next_index] {
                continue;
            }
            best_cost[next_index] = next_cost;
            prev[next_index] = Some(state);
            let manhattan = (nx - end_ix).unsigned_abs() + (ny - end_iy).unsigned_abs();
            let est = next_cost.saturating_add(manhattan.saturating_mul(step_cost));
            heap.push(GridEntry {
                est,
                cost: next_cost,
                state: GridState {
                    x: nx,
                    y: ny,
                    dir: dir_index as u8,
                },
            });
        }
    }

    let end_state = end_state?;
    let mut cells: Vec<(i32, i32)> = Vec::new();
    let mut cursor = end_state;
    loop {
        cells.push((cursor.x, cursor.y));
        let index = ((cursor.y * cols + cursor.x) as usize) * 4 + cursor.dir as usize;
        match prev[index] {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    cells.reverse();
    if cells.is_empty() {
        return None;
    }

    let mut points: Vec<(f32, f32)> = Vec::with_capacity(cells.len() + 4);
    points.push(start);
    if let Some(&(ix, iy)) = cells.first() {
        let (cx, cy) = grid.cell_center(ix, iy);
        match start_side {
            PortSide::Left | PortSide::Right => points.push((cx, start.1)),
            PortSide::Top | PortSide::Bottom => points.push((start.0, cy)),
        }
        points.push((cx, cy));
    }
    for &(ix, iy) in cells.iter().skip(1) {
        points.push(grid.cell_center(ix, iy));
    }
    if let Some(&(ix, iy)) = cells.last() {
        let (cx, cy) = grid.cell_center(ix, iy);
        match end_side {
            PortSide::Left | PortSide::Right => points.push((cx, end.1)),
            PortSide::Top | PortSide::Bottom => points.push((end.0, cy)),
        }
    }
    points.push(end);
    Some(compress_path(&points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;

    fn grid_over(obstacles: &[Rect]) -> RoutingGrid {
        RoutingGrid::build(obstacles, &RouterConfig::default()).expect("grid build failed")
    }

    #[test]
    fn cells_inside_obstacles_are_blocked() {
        let grid = grid_over(&[Rect::new(0.0, 0.0, 50.0, 50.0)]);
        let (ix, iy) = grid.cell_for_point(25.0, 25.0).expect("cell lookup");
        assert!(grid.is_blocked(ix, iy));
        let (ox, oy) = grid.cell_for_point(-30.0, -30.0).expect("cell lookup");
        assert!(!grid.is_blocked(ox, oy));
    }

    #[test]
    fn detours_around_a_wall() {
        let wall = Rect::new(40.0, -100.0, 20.0, 200.0);
        let grid = grid_over(&[wall]);
        let occupancy = EdgeOccupancy::new(12.0);
        let config = RouterConfig::default();
        let path = route_on_grid(
            &grid,
            (0.0, 0.0),
            (100.0, 0.0),
            PortSide::Right,
            PortSide::Left,
            &occupancy,
            &config,
        )
        .expect("no route found");
        assert_eq!(path.first(), Some(&(0.0, 0.0)));
        assert_eq!(path.last(), Some(&(100.0, 0.0)));
        // Interior points stay off the wall.
        for &(x, y) in &path[1..path.len() - 1] {
            let inside =
                x > wall.min.x && x < wall.max.x && y > wall.min.y && y < wall.max.y;
            assert!(!inside, "point ({x}, {y}) crosses the wall");
        }
        // Orthogonal segments only.
        for pair in path.windows(2) {
            let (x1, y1) = pair[0];
            let (x2, y2) = pair[1];
            assert!(
                (x1 - x2).abs() < 1e-4 || (y1 - y2).abs() < 1e-4,
                "diagonal segment ({x1},{y1}) -> ({x2},{y2})"
            );
        }
    }

    #[test]
    fn grid_is_skipped_when_cell_cap_is_exceeded() {
        let config = RouterConfig {
            max_grid_cells: 10,
            ..RouterConfig::default()
        };
        let grid = RoutingGrid::build(&[Rect::new(0.0, 0.0, 1000.0, 1000.0)], &config);
        assert!(grid.is_none());
    }
}
