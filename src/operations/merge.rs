use tracing::{debug, warn};

use crate::error::{GeometryError, Result};
use crate::math::segment_2d::{are_collinear, extents_overlap, extreme_points, project};
use crate::math::snap::snap_to_grid;
use crate::naming::inherit;
use crate::net::{NameStrength, NetNaming, NetStore, SegmentData, SegmentId};

/// Result of merging a candidate segment with its collinear neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The segment to insert in place of the candidate.
    pub merged: SegmentData,
    /// Placed segments the merged segment supersedes.
    pub absorbed: Vec<SegmentId>,
}

impl MergeOutcome {
    /// Returns `true` if the union was abandoned because of a name conflict.
    #[must_use]
    pub fn is_conflicted(&self) -> bool {
        self.merged.naming.conflict
    }
}

/// Combines a candidate segment with every placed segment lying on the same
/// line whose extent overlaps or touches it.
///
/// The store is only read; the caller replaces the absorbed segments.
pub struct MergeOverlapping {
    candidate: SegmentData,
    grid: i64,
}

impl MergeOverlapping {
    /// Creates a new `MergeOverlapping` operation.
    #[must_use]
    pub fn new(candidate: SegmentData, grid: i64) -> Self {
        Self { candidate, grid }
    }

    /// Executes the merge.
    ///
    /// Without overlapping neighbours the candidate comes back unchanged. When
    /// the names of the participants cannot be reconciled the union is
    /// abandoned: the candidate comes back flagged as conflicted and nothing
    /// is absorbed.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate, or the snapped union, has zero length.
    pub fn execute(&self, store: &NetStore) -> Result<MergeOutcome> {
        let candidate = &self.candidate;
        if candidate.is_degenerate() {
            return Err(GeometryError::ZeroLength {
                x: candidate.p1.x,
                y: candidate.p1.y,
            }
            .into());
        }

        let overlapping: Vec<(SegmentId, &SegmentData)> = store
            .segments()
            .filter(|(_, s)| {
                are_collinear(&candidate.p1, &candidate.p2, &s.p1, &s.p2)
                    && extents_overlap(&candidate.p1, &candidate.p2, &s.p1, &s.p2)
            })
            .collect();

        if overlapping.is_empty() {
            return Ok(MergeOutcome {
                merged: candidate.clone(),
                absorbed: Vec::new(),
            });
        }

        let mut naming = binding_naming(&candidate.naming);
        let mut strongest = naming.strength;
        for (id, other) in &overlapping {
            let mut other_naming = binding_naming(&other.naming);
            strongest = strongest.max(other_naming.strength);
            if !inherit(&mut naming, &mut other_naming) {
                warn!(
                    segment = ?id,
                    candidate = naming.name_str(),
                    existing = other_naming.name_str(),
                    "conflicting names; overlapping segments left unmerged"
                );
                let mut merged = candidate.clone();
                merged.naming.conflict = true;
                return Ok(MergeOutcome {
                    merged,
                    absorbed: Vec::new(),
                });
            }
        }

        let mut points = Vec::with_capacity(2 + overlapping.len() * 2);
        points.extend(candidate.endpoints());
        for (_, other) in &overlapping {
            points.extend(other.endpoints());
        }
        let axis = candidate.direction();
        let Some((lo, hi)) = extreme_points(&points, &axis) else {
            return Err(GeometryError::Degenerate("merge without endpoints".into()).into());
        };

        // Keep the drawing direction of the candidate.
        let (p1, p2) = if project(&candidate.p1, &lo, &hi) <= project(&candidate.p2, &lo, &hi) {
            (lo, hi)
        } else {
            (hi, lo)
        };
        let width = overlapping
            .iter()
            .map(|(_, s)| s.width)
            .fold(candidate.width, u32::max);

        let mut merged = SegmentData::new(snap_to_grid(&p1, self.grid), snap_to_grid(&p2, self.grid))?
            .with_width(width)
            .with_mode(candidate.mode);
        // A user-set name survives being absorbed.
        naming.strength = strongest;
        merged.naming = naming;

        debug!(
            absorbed = overlapping.len(),
            name = merged.naming.name_str(),
            "merged overlapping segments"
        );

        Ok(MergeOutcome {
            merged,
            absorbed: overlapping.into_iter().map(|(id, _)| id).collect(),
        })
    }
}

/// Generated default names do not bind a merge; the next grouping pass
/// recomputes them.
fn binding_naming(naming: &NetNaming) -> NetNaming {
    if naming.strength <= NameStrength::Weak {
        NetNaming::default()
    } else {
        NetNaming {
            conflict: false,
            ..naming.clone()
        }
    }
}
