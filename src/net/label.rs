use crate::math::Point;

slotmap::new_key_type! {
    /// Unique identifier for a net label in the net store.
    pub struct LabelId;
}

/// A net label: text anchored on a wire that names its whole net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelData {
    /// Anchor point; the label names the segment passing through it.
    pub position: Point,
    pub text: String,
}

impl LabelData {
    #[must_use]
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}
