use std::collections::HashMap;

use crate::error::StoreError;
use crate::math::Point;

use super::{NetStore, SegmentId};

/// Bucket of the coarse grid an endpoint falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey {
    x: i64,
    y: i64,
}

impl CellKey {
    fn new(p: &Point, cell: i64) -> Self {
        Self {
            x: p.x.div_euclid(cell),
            y: p.y.div_euclid(cell),
        }
    }
}

/// Spatial hash of placed segment endpoints answering "touches" queries
/// without scanning the whole drawing.
///
/// Buckets are `tolerance` wide, so two coincident endpoints always sit in
/// the same or an adjacent bucket. The index is a snapshot: rebuild it after
/// moving endpoints.
#[derive(Debug)]
pub struct EndpointIndex {
    cell: i64,
    tolerance: i64,
    buckets: HashMap<CellKey, Vec<SegmentId>>,
}

impl EndpointIndex {
    /// Indexes every placed segment of `store`.
    #[must_use]
    pub fn build(store: &NetStore, tolerance: i64) -> Self {
        let cell = tolerance.max(1);
        let mut buckets: HashMap<CellKey, Vec<SegmentId>> = HashMap::new();
        for (id, segment) in store.segments() {
            for p in segment.endpoints() {
                let ids = buckets.entry(CellKey::new(&p, cell)).or_default();
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
        }
        Self {
            cell,
            tolerance,
            buckets,
        }
    }

    /// Placed segments with an endpoint coinciding with an endpoint of `id`,
    /// in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` has been purged.
    pub fn touching(&self, store: &NetStore, id: SegmentId) -> Result<Vec<SegmentId>, StoreError> {
        let data = store.segment(id)?;
        let mut found = Vec::new();
        for p in data.endpoints() {
            let center = CellKey::new(&p, self.cell);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let key = CellKey {
                        x: center.x + dx,
                        y: center.y + dy,
                    };
                    if let Some(ids) = self.buckets.get(&key) {
                        found.extend(ids.iter().copied().filter(|other| *other != id));
                    }
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found.retain(|other| {
            store
                .placed_segment(*other)
                .is_ok_and(|other_data| data.touches(other_data, self.tolerance))
        });
        Ok(found)
    }
}
