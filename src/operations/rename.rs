use crate::error::{OperationError, Result};
use crate::history::EditCommand;
use crate::naming::parse_bus_notation;
use crate::net::{NameStrength, NetNaming, NetStore, SegmentId};

/// Gives a segment a user-chosen name with `Set` strength.
pub struct RenameNet {
    segment: SegmentId,
    name: String,
}

impl RenameNet {
    /// Creates a new `RenameNet` operation.
    #[must_use]
    pub fn new(segment: SegmentId, name: impl Into<String>) -> Self {
        Self {
            segment,
            name: name.into(),
        }
    }

    /// Executes the rename and returns the command that reverts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid plain or bus net name, or
    /// the segment is not placed in the drawing.
    pub fn execute(&self, store: &mut NetStore) -> Result<EditCommand> {
        parse_bus_notation(&self.name)?;
        store.placed_segment(self.segment)?;
        let naming = &mut store.segment_mut(self.segment)?.naming;
        let before = naming.clone();
        *naming = NetNaming::new(self.name.clone(), NameStrength::Set);
        Ok(EditCommand::Rename {
            segment: self.segment,
            before,
            after: naming.clone(),
        })
    }
}

/// Drops a segment's resolved name.
///
/// A name the user set explicitly cannot be cleared this way.
pub struct ClearName {
    segment: SegmentId,
}

impl ClearName {
    /// Creates a new `ClearName` operation.
    #[must_use]
    pub fn new(segment: SegmentId) -> Self {
        Self { segment }
    }

    /// Executes the reset and returns the command that reverts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment carries a `Set` name or is not placed.
    pub fn execute(&self, store: &mut NetStore) -> Result<EditCommand> {
        store.placed_segment(self.segment)?;
        let naming = &mut store.segment_mut(self.segment)?.naming;
        if naming.strength == NameStrength::Set {
            return Err(OperationError::InvalidInput(format!(
                "cannot clear user-set name {:?}",
                naming.name_str()
            ))
            .into());
        }
        let before = std::mem::take(naming);
        Ok(EditCommand::Rename {
            segment: self.segment,
            before,
            after: NetNaming::default(),
        })
    }
}
