use crate::math::Point;

slotmap::new_key_type! {
    /// Unique identifier for a pin in the net store.
    pub struct PinId;
}

/// Signal direction of a pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PinDirection {
    #[default]
    Input,
    Output,
    Inout,
}

/// Electrical class of the signal carried by a pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignalType {
    #[default]
    Signal,
    Power,
    Ground,
    Clock,
}

/// Where a pin comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinKind {
    /// A pin of a placed symbol instance, e.g. `I3`.
    Symbol { instance: String },
    /// An I/O pin on the schematic boundary.
    Boundary,
}

/// Data associated with a pin.
///
/// The engine reads pins but never mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinData {
    /// Scene position of the connection point.
    pub position: Point,
    /// Base name, possibly bus-noted (`d<0:3>`).
    pub name: String,
    pub direction: PinDirection,
    pub signal: SignalType,
    pub kind: PinKind,
}

impl PinData {
    /// Creates a schematic boundary pin.
    #[must_use]
    pub fn boundary(position: Point, name: impl Into<String>, direction: PinDirection) -> Self {
        Self {
            position,
            name: name.into(),
            direction,
            signal: SignalType::Signal,
            kind: PinKind::Boundary,
        }
    }

    /// Creates a pin belonging to a symbol instance.
    #[must_use]
    pub fn symbol(
        position: Point,
        instance: impl Into<String>,
        name: impl Into<String>,
        direction: PinDirection,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            direction,
            signal: SignalType::Signal,
            kind: PinKind::Symbol {
                instance: instance.into(),
            },
        }
    }

    /// Sets the signal class.
    #[must_use]
    pub fn with_signal(mut self, signal: SignalType) -> Self {
        self.signal = signal;
        self
    }

    /// Returns `true` if the pin names a global net (`vdd!`).
    #[must_use]
    pub fn is_global(&self, suffix: &str) -> bool {
        !suffix.is_empty() && self.name.ends_with(suffix)
    }

    /// Returns `true` for schematic boundary pins.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, PinKind::Boundary)
    }

    /// Instance name for symbol pins.
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        match &self.kind {
            PinKind::Symbol { instance } => Some(instance),
            PinKind::Boundary => None,
        }
    }
}
