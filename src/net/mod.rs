pub mod index;
pub mod label;
pub mod pin;
pub mod segment;

pub use index::EndpointIndex;
pub use label::{LabelData, LabelId};
pub use pin::{PinData, PinDirection, PinId, PinKind, SignalType};
pub use segment::{NameStrength, NetNaming, SegmentData, SegmentId};

use std::collections::HashSet;

use crate::error::StoreError;
use crate::math::segment_2d::coincident;
use crate::math::Point;
use slotmap::SlotMap;

/// Any entity the engine can find at a point of the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Segment(SegmentId),
    Pin(PinId),
    Label(LabelId),
}

/// Central arena that owns all entities of one drawing.
///
/// Entities reference each other via typed IDs (generational indices).
/// Removing an entity from the drawing only detaches it, so the mutation log
/// can put it back under the same ID. Purging destroys it for good.
#[derive(Debug, Default)]
pub struct NetStore {
    segments: SlotMap<SegmentId, SegmentData>,
    pins: SlotMap<PinId, PinData>,
    labels: SlotMap<LabelId, LabelData>,
    detached: HashSet<Entity>,
}

impl NetStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Segment operations ---

    /// Inserts a segment into the drawing and returns its ID.
    pub fn add_segment(&mut self, data: SegmentData) -> SegmentId {
        self.segments.insert(data)
    }

    /// Returns a reference to the segment data, placed or detached.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has been purged.
    pub fn segment(&self, id: SegmentId) -> Result<&SegmentData, StoreError> {
        self.segments
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("segment".into()))
    }

    /// Returns a mutable reference to the segment data, placed or detached.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has been purged.
    pub fn segment_mut(&mut self, id: SegmentId) -> Result<&mut SegmentData, StoreError> {
        self.segments
            .get_mut(id)
            .ok_or_else(|| StoreError::EntityNotFound("segment".into()))
    }

    /// Returns the segment only if it is currently part of the drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is purged or detached.
    pub fn placed_segment(&self, id: SegmentId) -> Result<&SegmentData, StoreError> {
        let data = self.segment(id)?;
        if self.detached.contains(&Entity::Segment(id)) {
            return Err(StoreError::Detached("segment".into()));
        }
        Ok(data)
    }

    /// IDs of all segments placed in the drawing, in arena order.
    #[must_use]
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments().map(|(id, _)| id).collect()
    }

    /// Iterates over the segments placed in the drawing.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &SegmentData)> + '_ {
        self.segments
            .iter()
            .filter(|(id, _)| !self.detached.contains(&Entity::Segment(*id)))
    }

    // --- Pin operations ---

    /// Inserts a pin into the drawing and returns its ID.
    pub fn add_pin(&mut self, data: PinData) -> PinId {
        self.pins.insert(data)
    }

    /// Returns a reference to the pin data, placed or detached.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin has been purged.
    pub fn pin(&self, id: PinId) -> Result<&PinData, StoreError> {
        self.pins
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("pin".into()))
    }

    /// Returns a mutable reference to the pin data, placed or detached.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin has been purged.
    pub fn pin_mut(&mut self, id: PinId) -> Result<&mut PinData, StoreError> {
        self.pins
            .get_mut(id)
            .ok_or_else(|| StoreError::EntityNotFound("pin".into()))
    }

    /// Iterates over the pins placed in the drawing.
    pub fn pins(&self) -> impl Iterator<Item = (PinId, &PinData)> + '_ {
        self.pins
            .iter()
            .filter(|(id, _)| !self.detached.contains(&Entity::Pin(*id)))
    }

    // --- Label operations ---

    /// Inserts a net label into the drawing and returns its ID.
    pub fn add_label(&mut self, data: LabelData) -> LabelId {
        self.labels.insert(data)
    }

    /// Returns a reference to the label data, placed or detached.
    ///
    /// # Errors
    ///
    /// Returns an error if the label has been purged.
    pub fn label(&self, id: LabelId) -> Result<&LabelData, StoreError> {
        self.labels
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("label".into()))
    }

    /// Iterates over the labels placed in the drawing.
    pub fn labels(&self) -> impl Iterator<Item = (LabelId, &LabelData)> + '_ {
        self.labels
            .iter()
            .filter(|(id, _)| !self.detached.contains(&Entity::Label(*id)))
    }

    // --- Placement ---

    /// Returns `true` if the entity exists and is part of the drawing.
    #[must_use]
    pub fn is_placed(&self, entity: Entity) -> bool {
        self.exists(entity) && !self.detached.contains(&entity)
    }

    /// Returns `true` if the entity has not been purged.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        match entity {
            Entity::Segment(id) => self.segments.contains_key(id),
            Entity::Pin(id) => self.pins.contains_key(id),
            Entity::Label(id) => self.labels.contains_key(id),
        }
    }

    /// Takes an entity out of the drawing, keeping its data.
    ///
    /// Returns `false` if the entity was purged or already detached.
    pub fn detach(&mut self, entity: Entity) -> bool {
        self.exists(entity) && self.detached.insert(entity)
    }

    /// Puts a detached entity back into the drawing.
    ///
    /// Returns `false` if the entity was purged or already placed.
    pub fn attach(&mut self, entity: Entity) -> bool {
        self.exists(entity) && self.detached.remove(&entity)
    }

    /// Destroys an entity. Later lookups of its ID fail.
    pub fn purge(&mut self, entity: Entity) {
        self.detached.remove(&entity);
        match entity {
            Entity::Segment(id) => {
                self.segments.remove(id);
            }
            Entity::Pin(id) => {
                self.pins.remove(id);
            }
            Entity::Label(id) => {
                self.labels.remove(id);
            }
        }
    }

    /// Destroys every detached entity.
    pub fn purge_detached(&mut self) {
        let detached: Vec<Entity> = self.detached.iter().copied().collect();
        for entity in detached {
            self.purge(entity);
        }
    }

    // --- Queries ---

    /// Every placed entity located at `point`.
    ///
    /// Segments match when the point lies anywhere on them, endpoints included.
    #[must_use]
    pub fn entities_at(&self, point: &Point, tolerance: i64) -> Vec<Entity> {
        let segments = self
            .segments()
            .filter(|(_, s)| s.contains_point(point, tolerance))
            .map(|(id, _)| Entity::Segment(id));
        let pins = self
            .pins()
            .filter(|(_, p)| coincident(&p.position, point, tolerance))
            .map(|(id, _)| Entity::Pin(id));
        let labels = self
            .labels()
            .filter(|(_, l)| coincident(&l.position, point, tolerance))
            .map(|(id, _)| Entity::Label(id));
        segments.chain(pins).chain(labels).collect()
    }
}
