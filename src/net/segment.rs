use crate::error::GeometryError;
use crate::math::segment_2d::{coincident, is_zero_length, lies_strictly_inside};
use crate::math::{OrientationMode, Point, Vector};

slotmap::new_key_type! {
    /// Unique identifier for a wire segment in the net store.
    pub struct SegmentId;
}

/// Tie-break level deciding which name wins between connected segments.
///
/// Ordered: `NoName < Weak < Inherit < Set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameStrength {
    /// No name has been resolved.
    #[default]
    NoName = 0,
    /// Generated default name.
    Weak = 1,
    /// Name propagated from a pin or a stronger neighbour.
    Inherit = 2,
    /// Name given explicitly by the user.
    Set = 3,
}

impl NameStrength {
    /// Strength handed to the sub-segments of a split that no longer touch
    /// the naming source.
    ///
    /// `Set` and `Inherit` never drop below `Weak`.
    #[must_use]
    pub fn decremented(self) -> Self {
        match self {
            Self::Set => Self::Inherit,
            Self::Inherit => Self::Weak,
            Self::Weak | Self::NoName => Self::NoName,
        }
    }
}

/// Naming state of a segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NetNaming {
    /// Resolved name, plain (`vdd`) or bus-noted (`data<0:7>`).
    pub name: Option<String>,
    /// How authoritative `name` is.
    pub strength: NameStrength,
    /// Set when an equal-or-stronger neighbour disagrees on the name.
    pub conflict: bool,
}

impl NetNaming {
    /// Creates a naming with the given name and strength, without conflict.
    #[must_use]
    pub fn new(name: impl Into<String>, strength: NameStrength) -> Self {
        Self {
            name: Some(name.into()),
            strength,
            conflict: false,
        }
    }

    /// Returns the name, or an empty string when unnamed.
    #[must_use]
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Returns `true` if both namings carry the same name text.
    #[must_use]
    pub fn same_name(&self, other: &Self) -> bool {
        self.name_str() == other.name_str()
    }
}

/// Data associated with a drawn wire segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentData {
    /// First endpoint, where the drawing gesture started.
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
    /// Angle constraint the segment was drawn with.
    pub mode: OrientationMode,
    /// `0` for a single-bit wire, `> 0` for a bus.
    pub width: u32,
    /// Naming state.
    pub naming: NetNaming,
}

impl SegmentData {
    /// Creates a single-bit, unnamed orthogonal segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `p1 == p2`.
    pub fn new(p1: Point, p2: Point) -> Result<Self, GeometryError> {
        if is_zero_length(&p1, &p2) {
            return Err(GeometryError::ZeroLength { x: p1.x, y: p1.y });
        }
        Ok(Self {
            p1,
            p2,
            mode: OrientationMode::Orthogonal,
            width: 0,
            naming: NetNaming::default(),
        })
    }

    /// Sets the bus width.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Sets the orientation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: OrientationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the name and its strength.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>, strength: NameStrength) -> Self {
        self.naming = NetNaming::new(name, strength);
        self
    }

    /// Returns both endpoints.
    #[must_use]
    pub fn endpoints(&self) -> [Point; 2] {
        [self.p1, self.p2]
    }

    /// Direction from `p1` to `p2`.
    #[must_use]
    pub fn direction(&self) -> Vector {
        self.p2 - self.p1
    }

    /// Returns `true` if this segment is a bus.
    #[must_use]
    pub fn is_bus(&self) -> bool {
        self.width > 0
    }

    /// Returns `true` if either endpoint is within `tolerance` of `point`.
    #[must_use]
    pub fn has_endpoint_at(&self, point: &Point, tolerance: i64) -> bool {
        coincident(&self.p1, point, tolerance) || coincident(&self.p2, point, tolerance)
    }

    /// Returns `true` if `point` lies on the segment, endpoints included.
    #[must_use]
    pub fn contains_point(&self, point: &Point, tolerance: i64) -> bool {
        self.has_endpoint_at(point, tolerance)
            || lies_strictly_inside(point, &self.p1, &self.p2, tolerance)
    }

    /// Returns `true` if any endpoint pair of the two segments coincides.
    #[must_use]
    pub fn touches(&self, other: &Self, tolerance: i64) -> bool {
        other.has_endpoint_at(&self.p1, tolerance) || other.has_endpoint_at(&self.p2, tolerance)
    }

    /// Returns `true` if both endpoints are identical.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        is_zero_length(&self.p1, &self.p2)
    }
}
