use crate::math::Point;
use crate::net::{Entity, NetNaming, NetStore, PinId, SegmentId};

use super::Command;

/// A single reversible edit of a [`NetStore`].
///
/// Commands are recorded after they have been applied and only hold IDs and
/// before/after values, so an edit on a purged entity does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// An entity was placed in the drawing.
    Add(Entity),
    /// An entity was taken out of the drawing.
    Remove(Entity),
    /// A segment's name, strength or conflict flag changed.
    Rename {
        segment: SegmentId,
        before: NetNaming,
        after: NetNaming,
    },
    /// A segment's endpoints changed (move or rotate).
    Reshape {
        segment: SegmentId,
        before: [Point; 2],
        after: [Point; 2],
    },
    /// A pin was moved.
    MovePin {
        pin: PinId,
        before: Point,
        after: Point,
    },
}

impl EditCommand {
    fn set_naming(store: &mut NetStore, segment: SegmentId, naming: &NetNaming) {
        if let Ok(data) = store.segment_mut(segment) {
            data.naming.clone_from(naming);
        }
    }

    fn set_endpoints(store: &mut NetStore, segment: SegmentId, [p1, p2]: [Point; 2]) {
        if let Ok(data) = store.segment_mut(segment) {
            data.p1 = p1;
            data.p2 = p2;
        }
    }

    fn set_pin_position(store: &mut NetStore, pin: PinId, position: Point) {
        if let Ok(data) = store.pin_mut(pin) {
            data.position = position;
        }
    }
}

impl Command for EditCommand {
    type Target = NetStore;

    fn undo(&self, store: &mut NetStore) {
        match self {
            Self::Add(entity) => {
                store.detach(*entity);
            }
            Self::Remove(entity) => {
                store.attach(*entity);
            }
            Self::Rename {
                segment, before, ..
            } => Self::set_naming(store, *segment, before),
            Self::Reshape {
                segment, before, ..
            } => Self::set_endpoints(store, *segment, *before),
            Self::MovePin { pin, before, .. } => Self::set_pin_position(store, *pin, *before),
        }
    }

    fn redo(&self, store: &mut NetStore) {
        match self {
            Self::Add(entity) => {
                store.attach(*entity);
            }
            Self::Remove(entity) => {
                store.detach(*entity);
            }
            Self::Rename { segment, after, .. } => Self::set_naming(store, *segment, after),
            Self::Reshape { segment, after, .. } => Self::set_endpoints(store, *segment, *after),
            Self::MovePin { pin, after, .. } => Self::set_pin_position(store, *pin, *after),
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Add(_) => "add".into(),
            Self::Remove(_) => "remove".into(),
            Self::Rename { after, .. } => format!("rename to {}", after.name_str()),
            Self::Reshape { .. } => "reshape wire".into(),
            Self::MovePin { .. } => "move pin".into(),
        }
    }
}
