mod group;
mod merge;
mod pin_map;
mod rename;
mod split;

pub use group::{GroupAllNets, GroupReport, NetComponent};
pub use merge::{MergeOutcome, MergeOverlapping};
pub use pin_map::{PinNetMap, PinNets};
pub use rename::{ClearName, RenameNet};
pub use split::SplitAt;
