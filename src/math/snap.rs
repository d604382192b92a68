use super::Point;

/// Angle constraint applied to a freshly drawn segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrientationMode {
    /// Horizontal or vertical only.
    #[default]
    Orthogonal,
    /// Multiples of 45 degrees.
    Diagonal,
    /// Any angle; only the grid applies.
    Free,
}

/// Rounds a coordinate to the nearest multiple of `grid`.
#[must_use]
pub fn snap_coord(v: i64, grid: i64) -> i64 {
    if grid <= 1 {
        return v;
    }
    (v + grid / 2).div_euclid(grid) * grid
}

/// Rounds both coordinates of `p` to the drawing grid.
#[must_use]
pub fn snap_to_grid(p: &Point, grid: i64) -> Point {
    Point::new(snap_coord(p.x, grid), snap_coord(p.y, grid))
}

/// Locks `end` to the angles permitted by `mode`, measured from `start`.
#[must_use]
pub fn snap_endpoint(start: &Point, end: &Point, mode: OrientationMode) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    match mode {
        OrientationMode::Free => *end,
        OrientationMode::Orthogonal => {
            if dx.abs() >= dy.abs() {
                Point::new(end.x, start.y)
            } else {
                Point::new(start.x, end.y)
            }
        }
        OrientationMode::Diagonal => {
            let (ax, ay) = (i128::from(dx.abs()), i128::from(dy.abs()));
            // tan(22.5 deg) ~= 0.4142 separates the horizontal/vertical and 45 degree sectors.
            if ay * 10_000 < ax * 4_142 {
                Point::new(end.x, start.y)
            } else if ax * 10_000 < ay * 4_142 {
                Point::new(start.x, end.y)
            } else {
                let d = dx.abs().max(dy.abs());
                Point::new(start.x + d * dx.signum(), start.y + d * dy.signum())
            }
        }
    }
}

/// Snaps a drawn segment to the grid, then applies the orientation lock.
#[must_use]
pub fn snap_segment(p1: &Point, p2: &Point, mode: OrientationMode, grid: i64) -> (Point, Point) {
    let start = snap_to_grid(p1, grid);
    let end = snap_to_grid(p2, grid);
    (start, snap_endpoint(&start, &end, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn grid_rounding_handles_negatives() {
        assert_eq!(snap_coord(14, 10), 10);
        assert_eq!(snap_coord(15, 10), 20);
        assert_eq!(snap_coord(-5, 10), 0);
        assert_eq!(snap_coord(-6, 10), -10);
        assert_eq!(snap_coord(7, 1), 7);
    }

    #[test]
    fn orthogonal_lock_picks_dominant_axis() {
        assert_eq!(snap_endpoint(&p(0, 0), &p(30, 4), OrientationMode::Orthogonal), p(30, 0));
        assert_eq!(snap_endpoint(&p(0, 0), &p(4, -30), OrientationMode::Orthogonal), p(0, -30));
    }

    #[test]
    fn diagonal_lock_uses_45_degrees() {
        assert_eq!(snap_endpoint(&p(0, 0), &p(30, 28), OrientationMode::Diagonal), p(30, 30));
        assert_eq!(snap_endpoint(&p(0, 0), &p(-20, 18), OrientationMode::Diagonal), p(-20, 20));
        assert_eq!(snap_endpoint(&p(0, 0), &p(40, 5), OrientationMode::Diagonal), p(40, 0));
    }

    #[test]
    fn free_mode_only_snaps_grid() {
        let (a, b) = snap_segment(&p(1, 2), &p(33, 18), OrientationMode::Free, 10);
        assert_eq!(a, p(0, 0));
        assert_eq!(b, p(30, 20));
    }
}
