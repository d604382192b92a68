pub mod segment_2d;
pub mod snap;

pub use snap::OrientationMode;

/// Drawing-space point. Coordinates are integral scene units.
pub type Point = nalgebra::Point2<i64>;

/// Drawing-space displacement.
pub type Vector = nalgebra::Vector2<i64>;

/// Default snap pitch of the drawing grid.
pub const DEFAULT_GRID: i64 = 10;

/// Default radius within which two points are considered coincident.
pub const DEFAULT_TOLERANCE: i64 = 2;
