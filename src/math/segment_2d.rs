use super::{Point, Vector};

/// Integer 2D cross product, widened so scene coordinates cannot overflow.
#[must_use]
pub fn cross(u: &Vector, v: &Vector) -> i128 {
    i128::from(u.x) * i128::from(v.y) - i128::from(u.y) * i128::from(v.x)
}

/// Integer 2D dot product, widened so scene coordinates cannot overflow.
#[must_use]
pub fn dot(u: &Vector, v: &Vector) -> i128 {
    i128::from(u.x) * i128::from(v.x) + i128::from(u.y) * i128::from(v.y)
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn distance_sq(a: &Point, b: &Point) -> i128 {
    let d = b - a;
    dot(&d, &d)
}

/// Returns `true` if `a` and `b` lie within `tolerance` of each other.
#[must_use]
pub fn coincident(a: &Point, b: &Point, tolerance: i64) -> bool {
    let tol = i128::from(tolerance);
    distance_sq(a, b) <= tol * tol
}

/// Returns `true` if the segment has no extent.
#[must_use]
pub fn is_zero_length(a: &Point, b: &Point) -> bool {
    a == b
}

/// Returns `true` if both segments lie on the same infinite line.
///
/// Degenerate segments are never collinear with anything.
#[must_use]
pub fn are_collinear(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> bool {
    let da = a1 - a0;
    let db = b1 - b0;
    if is_zero_length(a0, a1) || is_zero_length(b0, b1) {
        return false;
    }
    cross(&da, &db) == 0 && cross(&da, &(b0 - a0)) == 0
}

/// Returns `true` if the segments are perpendicular to each other.
#[must_use]
pub fn are_orthogonal(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> bool {
    if is_zero_length(a0, a1) || is_zero_length(b0, b1) {
        return false;
    }
    dot(&(a1 - a0), &(b1 - b0)) == 0
}

/// Projects `p` onto the axis of `a0 -> a1`.
///
/// The result is scaled by `|a1 - a0|`: `0` at `a0`, `|a1 - a0|^2` at `a1`.
#[must_use]
pub fn project(p: &Point, a0: &Point, a1: &Point) -> i128 {
    dot(&(p - a0), &(a1 - a0))
}

/// Checks whether two collinear segments share at least one point.
///
/// Touching extents (`[0, 10]` and `[10, 20]`) count as overlapping.
#[must_use]
pub fn extents_overlap(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> bool {
    let len_sq = distance_sq(a0, a1);
    let t0 = project(b0, a0, a1);
    let t1 = project(b1, a0, a1);
    t0.max(t1) >= 0 && t0.min(t1) <= len_sq
}

/// Returns `true` if `p` lies on the segment `a0 -> a1` within `tolerance`
/// but is not coincident with either endpoint.
#[must_use]
pub fn lies_strictly_inside(p: &Point, a0: &Point, a1: &Point, tolerance: i64) -> bool {
    if is_zero_length(a0, a1) {
        return false;
    }
    if coincident(p, a0, tolerance) || coincident(p, a1, tolerance) {
        return false;
    }
    let d = a1 - a0;
    let len_sq = dot(&d, &d);
    let off = cross(&d, &(p - a0));
    let tol = i128::from(tolerance);
    // Perpendicular distance |off| / |d| must not exceed the tolerance.
    if off.saturating_mul(off) > tol * tol * len_sq {
        return false;
    }
    let t = project(p, a0, a1);
    t > 0 && t < len_sq
}

/// Returns the two points of `points` that lie furthest apart along `axis`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn extreme_points(points: &[Point], axis: &Vector) -> Option<(Point, Point)> {
    let first = points.first()?;
    let mut lo = *first;
    let mut hi = *first;
    let mut lo_t = dot(&first.coords, axis);
    let mut hi_t = lo_t;
    for p in &points[1..] {
        let t = dot(&p.coords, axis);
        if t < lo_t {
            lo_t = t;
            lo = *p;
        }
        if t > hi_t {
            hi_t = t;
            hi = *p;
        }
    }
    Some((lo, hi))
}

/// Orders `points` by a nearest-neighbour walk starting from `start`.
///
/// `start` is the first element of the result. Ties resolve to the point that
/// appears first in `points`.
#[must_use]
pub fn nearest_neighbour_walk(start: Point, points: &[Point]) -> Vec<Point> {
    let mut remaining: Vec<Point> = points.to_vec();
    let mut ordered = Vec::with_capacity(points.len() + 1);
    ordered.push(start);
    let mut current = start;

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_dist = distance_sq(&current, &remaining[0]);
        for (i, p) in remaining.iter().enumerate().skip(1) {
            let d = distance_sq(&current, p);
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        current = remaining.remove(best);
        ordered.push(current);
    }

    ordered
}
