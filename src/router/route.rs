use crate::config::RouterConfig;
use crate::geom::Rect;

use super::PortSide;
use super::grid::{RoutingGrid, route_on_grid};
use super::occupancy::EdgeOccupancy;

pub(super) type Segment = ((f32, f32), (f32, f32));

/// Everything a single edge needs to be routed: exact port anchors, the
/// sides they leave their obstacles on, and the padded obstacle set.
pub(super) struct RouteContext<'a> {
    pub(super) start: (f32, f32),
    pub(super) end: (f32, f32),
    pub(super) start_side: PortSide,
    pub(super) end_side: PortSide,
    pub(super) obstacles: &'a [Rect],
    pub(super) config: &'a RouterConfig,
}

#[derive(Debug, Clone, Copy)]
struct PathScore {
    hits: usize,
    crossings: usize,
    bends: usize,
    occupancy: u32,
    length: f32,
}

// Lexicographic: obstacle hits dominate, then crossings with paths routed
// earlier in the pass, then bends, then occupancy, then length.
fn better(a: &PathScore, b: &PathScore) -> bool {
    if a.hits != b.hits {
        return a.hits < b.hits;
    }
    if a.crossings != b.crossings {
        return a.crossings < b.crossings;
    }
    if a.bends != b.bends {
        return a.bends < b.bends;
    }
    if a.occupancy != b.occupancy {
        return a.occupancy < b.occupancy;
    }
    a.length < b.length
}

pub(super) fn stub_point(point: (f32, f32), side: PortSide, length: f32) -> (f32, f32) {
    match side {
        PortSide::Left => (point.0 - length, point.1),
        PortSide::Right => (point.0 + length, point.1),
        PortSide::Top => (point.0, point.1 - length),
        PortSide::Bottom => (point.0, point.1 + length),
    }
}

fn side_is_horizontal(side: PortSide) -> bool {
    matches!(side, PortSide::Left | PortSide::Right)
}

/// Routes one edge. Cheap elbow candidates are scored first; the grid A*
/// only runs when every candidate still cuts through an obstacle. The
/// returned polyline starts and ends exactly on the port anchors.
pub(super) fn route_edge(
    ctx: &RouteContext<'_>,
    grid: Option<&RoutingGrid>,
    occupancy: &EdgeOccupancy,
    existing: &[Segment],
) -> Vec<(f32, f32)> {
    let stub = ctx.config.obstacle_pad + ctx.config.stub_length;
    let route_start = stub_point(ctx.start, ctx.start_side, stub);
    let route_end = stub_point(ctx.end, ctx.end_side, stub);
    let horizontal = side_is_horizontal(ctx.start_side);

    let mut candidates: Vec<Vec<(f32, f32)>> = Vec::new();

    // Straight shot when the stubs already line up.
    let aligned = if horizontal {
        (route_start.1 - route_end.1).abs() <= 1e-4
    } else {
        (route_start.0 - route_end.0).abs() <= 1e-4
    };
    if aligned {
        candidates.push(vec![route_start, route_end]);
    }

    let mut offsets = vec![0.0f32];
    for i in 1..=ctx.config.detour_fan {
        let delta = ctx.config.detour_step * i as f32;
        offsets.push(delta);
        offsets.push(-delta);
    }

    for &offset in &offsets {
        if horizontal {
            let mid_x = (route_start.0 + route_end.0) / 2.0 + offset;
            candidates.push(vec![
                route_start,
                (mid_x, route_start.1),
                (mid_x, route_end.1),
                route_end,
            ]);
            let mid_y = (route_start.1 + route_end.1) / 2.0 + offset;
            candidates.push(vec![
                route_start,
                (route_start.0, mid_y),
                (route_end.0, mid_y),
                route_end,
            ]);
            if offset != 0.0 {
                // Channels hugging either endpoint; these are what resolve
                // backward edges, where the midline sits inside a body.
                let near_start = route_start.0 + offset;
                candidates.push(vec![
                    route_start,
                    (near_start, route_start.1),
                    (near_start, route_end.1),
                    route_end,
                ]);
                let near_end = route_end.0 + offset;
                candidates.push(vec![
                    route_start,
                    (near_end, route_start.1),
                    (near_end, route_end.1),
                    route_end,
                ]);
            }
        } else {
            let mid_y = (route_start.1 + route_end.1) / 2.0 + offset;
            candidates.push(vec![
                route_start,
                (route_start.0, mid_y),
                (route_end.0, mid_y),
                route_end,
            ]);
            let mid_x = (route_start.0 + route_end.0) / 2.0 + offset;
            candidates.push(vec![
                route_start,
                (mid_x, route_start.1),
                (mid_x, route_end.1),
                route_end,
            ]);
            if offset != 0.0 {
                let near_start = route_start.1 + offset;
                candidates.push(vec![
                    route_start,
                    (route_start.0, near_start),
                    (route_end.0, near_start),
                    route_end,
                ]);
                let near_end = route_end.1 + offset;
                candidates.push(vec![
                    route_start,
                    (route_start.0, near_end),
                    (route_end.0, near_end),
                    route_end,
                ]);
            }
        }
    }

    let mut scores: Vec<PathScore> = candidates
        .iter()
        .map(|points| score_path(points, ctx, occupancy, existing))
        .collect();

    let min_hits = scores.iter().map(|score| score.hits).min().unwrap_or(0);
    if min_hits > 0
        && ctx.config.enable_grid_router
        && let Some(grid) = grid
        && let Some(points) = route_on_grid(
            grid,
            route_start,
            route_end,
            ctx.start_side,
            ctx.end_side,
            occupancy,
            ctx.config,
        )
    {
        scores.push(score_path(&points, ctx, occupancy, existing));
        candidates.push(points);
    }

    let mut best_index = 0usize;
    for (index, score) in scores.iter().enumerate().skip(1) {
        if better(score, &scores[best_index]) {
            best_index = index;
        }
    }

    let mut combined = Vec::with_capacity(candidates[best_index].len() + 2);
    combined.push(ctx.start);
    combined.extend(candidates.swap_remove(best_index));
    combined.push(ctx.end);
    compress_path(&combined)
}

fn score_path(
    points: &[(f32, f32)],
    ctx: &RouteContext<'_>,
    occupancy: &EdgeOccupancy,
    existing: &[Segment],
) -> PathScore {
    PathScore {
        hits: path_obstacle_hits(points, ctx.obstacles),
        crossings: path_crossings(points, existing),
        bends: path_bend_count(points),
        occupancy: occupancy.score_path(points),
        length: path_length(points),
    }
}

/// Counts segment/obstacle incidences along a candidate. Zero means the
/// candidate clears every padded body.
pub(super) fn path_obstacle_hits(points: &[(f32, f32)], obstacles: &[Rect]) -> usize {
    if points.len() < 2 {
        return 0;
    }
    let mut count = 0usize;
    for segment in points.windows(2) {
        for obstacle in obstacles {
            if segment_intersects_rect(segment[0], segment[1], obstacle) {
                count += 1;
            }
        }
    }
    count
}

pub(super) fn path_crossings(points: &[(f32, f32)], existing: &[Segment]) -> usize {
    if points.len() < 2 || existing.is_empty() {
        return 0;
    }
    let mut crossings = 0usize;
    for segment in points.windows(2) {
        let a1 = segment[0];
        let a2 = segment[1];
        for &(b1, b2) in existing {
            // Shared endpoints (edges fanning out of one port) are not
            // crossings.
            if points_coincide(a1, b1)
                || points_coincide(a1, b2)
                || points_coincide(a2, b1)
                || points_coincide(a2, b2)
            {
                continue;
            }
            if segments_intersect(a1, a2, b1, b2) {
                crossings += 1;
            }
        }
    }
    crossings
}

fn points_coincide(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
}

pub(super) fn path_length(points: &[(f32, f32)]) -> f32 {
    let mut length = 0.0;
    for segment in points.windows(2) {
        let dx = segment[1].0 - segment[0].0;
        let dy = segment[1].1 - segment[0].1;
        length += (dx * dx + dy * dy).sqrt();
    }
    length
}

pub(super) fn path_bend_count(points: &[(f32, f32)]) -> usize {
    if points.len() < 3 {
        return 0;
    }
    let mut bends = 0usize;
    for index in 1..points.len() - 1 {
        let p0 = points[index - 1];
        let p1 = points[index];
        let p2 = points[index + 1];
        let dx1 = p1.0 - p0.0;
        let dy1 = p1.1 - p0.1;
        let dx2 = p2.0 - p1.0;
        let dy2 = p2.1 - p1.1;
        if (dx1.abs() <= 1e-4 && dy1.abs() <= 1e-4) || (dx2.abs() <= 1e-4 && dy2.abs() <= 1e-4) {
            continue;
        }
        if (dx1 * dy2 - dy1 * dx2).abs() > 1e-4 {
            bends += 1;
        }
    }
    bends
}

/// Drops duplicate and collinear interior points. The first and last
/// points always survive unchanged; callers rely on that for port
/// endpoint fidelity.
pub(super) fn compress_path(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    out.push(points[0]);
    for index in 1..points.len() - 1 {
        let prev = out[out.len() - 1];
        let curr = points[index];
        if (curr.0 - prev.0).abs() <= 1e-4 && (curr.1 - prev.1).abs() <= 1e-4 {
            continue;
        }
        let next = points[index + 1];
        let dx1 = curr.0 - prev.0;
        let dy1 = curr.1 - prev.1;
        let dx2 = next.0 - curr.0;
        let dy2 = next.1 - curr.1;
        if (dx1.abs() <= 1e-4 && dx2.abs() <= 1e-4) || (dy1.abs() <= 1e-4 && dy2.abs() <= 1e-4) {
            continue;
        }
        out.push(curr);
    }
    let last = points[points.len() - 1];
    let tail = out[out.len() - 1];
    if (last.0 - tail.0).abs() > 1e-4 || (last.1 - tail.1).abs() > 1e-4 {
        out.push(last);
    }
    out
}

pub(super) fn segment_intersects_rect(a: (f32, f32), b: (f32, f32), rect: &Rect) -> bool {
    let min_x = a.0.min(b.0);
    let max_x = a.0.max(b.0);
    let min_y = a.1.min(b.1);
    let max_y = a.1.max(b.1);
    if max_x < rect.min.x || min_x > rect.max.x || max_y < rect.min.y || min_y > rect.max.y {
        return false;
    }
    let point_inside = |p: (f32, f32)| {
        p.0 >= rect.min.x && p.0 <= rect.max.x && p.1 >= rect.min.y && p.1 <= rect.max.y
    };
    if point_inside(a) || point_inside(b) {
        return true;
    }
    let corners = [
        (rect.min.x, rect.min.y),
        (rect.max.x, rect.min.y),
        (rect.max.x, rect.max.y),
        (rect.min.x, rect.max.y),
    ];
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    for (c, d) in edges {
        if segments_intersect(a, b, c, d) {
            return true;
        }
    }
    false
}

pub(super) fn segments_intersect(
    a: (f32, f32),
    b: (f32, f32),
    c: (f32, f32),
    d: (f32, f32),
) -> bool {
    fn orient(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
        (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
    }
    fn on_segment(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> bool {
        let min_x = a.0.min(b.0);
        let max_x = a.0.max(b.0);
        let min_y = a.1.min(b.1);
        let max_y = a.1.max(b.1);
        c.0 >= min_x - 1e-6 && c.0 <= max_x + 1e-6 && c.1 >= min_y - 1e-6 && c.1 <= max_y + 1e-6
    }
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    if (o1 > 0.0 && o2 < 0.0 || o1 < 0.0 && o2 > 0.0)
        && (o3 > 0.0 && o4 < 0.0 || o3 < 0.0 && o4 > 0.0)
    {
        return true;
    }
    if o1.abs() <= 1e-6 && on_segment(a, b, c) {
        return true;
    }
    if o2.abs() <= 1e-6 && on_segment(a, b, d) {
        return true;
    }
    if o3.abs() <= 1e-6 && on_segment(c, d, a) {
        return true;
    }
    o4.abs() <= 1e-6 && on_segment(c, d, b)
}
