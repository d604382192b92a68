use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::math::segment_2d::{are_orthogonal, coincident, lies_strictly_inside, nearest_neighbour_walk};
use crate::math::Point;
use crate::net::{Entity, NetStore, SegmentData, SegmentId};

/// Splits a segment wherever an orthogonal segment ends or a pin sits on its
/// interior.
///
/// The store is only read; the caller replaces the segment with the pieces.
pub struct SplitAt {
    segment: SegmentData,
    tolerance: i64,
    exclude: Option<SegmentId>,
}

impl SplitAt {
    /// Creates a new `SplitAt` operation.
    #[must_use]
    pub fn new(segment: SegmentData, tolerance: i64) -> Self {
        Self {
            segment,
            tolerance,
            exclude: None,
        }
    }

    /// Ignores `id` when looking for split points, for splitting a segment
    /// that is itself placed in the store.
    #[must_use]
    pub fn excluding(mut self, id: SegmentId) -> Self {
        self.exclude = Some(id);
        self
    }

    /// Executes the split, returning the pieces ordered from `p1`.
    ///
    /// The first piece keeps the segment's naming; later pieces carry the same
    /// name one strength level lower. Without split points the segment comes
    /// back as the only piece.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has zero length.
    pub fn execute(&self, store: &NetStore) -> Result<Vec<SegmentData>> {
        let segment = &self.segment;
        if segment.is_degenerate() {
            return Err(GeometryError::ZeroLength {
                x: segment.p1.x,
                y: segment.p1.y,
            }
            .into());
        }

        let interior = self.split_points(store);
        if interior.is_empty() {
            return Ok(vec![segment.clone()]);
        }

        let mut stops = interior;
        stops.push(segment.p2);
        let ordered = nearest_neighbour_walk(segment.p1, &stops);

        let mut pieces: Vec<SegmentData> = Vec::with_capacity(ordered.len() - 1);
        for pair in ordered.windows(2) {
            let Ok(mut piece) = SegmentData::new(pair[0], pair[1]) else {
                continue;
            };
            piece.width = segment.width;
            piece.mode = segment.mode;
            piece.naming = segment.naming.clone();
            if !pieces.is_empty() {
                piece.naming.strength = segment.naming.strength.decremented();
            }
            pieces.push(piece);
        }

        debug!(pieces = pieces.len(), "split segment");
        Ok(pieces)
    }

    /// Interior points where the segment must be broken, without duplicates.
    fn split_points(&self, store: &NetStore) -> Vec<Point> {
        let segment = &self.segment;
        let entities = store
            .segments()
            .map(|(id, _)| Entity::Segment(id))
            .chain(store.pins().map(|(id, _)| Entity::Pin(id)))
            .chain(store.labels().map(|(id, _)| Entity::Label(id)));

        let mut points: Vec<Point> = Vec::new();
        for entity in entities {
            let candidates: Vec<Point> = match entity {
                Entity::Segment(id) if Some(id) == self.exclude => Vec::new(),
                Entity::Segment(id) => match store.segment(id) {
                    Ok(other) if are_orthogonal(&segment.p1, &segment.p2, &other.p1, &other.p2) => {
                        other.endpoints().to_vec()
                    }
                    _ => Vec::new(),
                },
                Entity::Pin(id) => store.pin(id).map(|pin| vec![pin.position]).unwrap_or_default(),
                // Labels name wires without breaking them.
                Entity::Label(_) => Vec::new(),
            };
            for point in candidates {
                if lies_strictly_inside(&point, &segment.p1, &segment.p2, self.tolerance)
                    && !points.iter().any(|q| coincident(q, &point, self.tolerance))
                {
                    points.push(point);
                }
            }
        }
        points
    }
}
