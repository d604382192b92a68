pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod math;
pub mod naming;
pub mod net;
pub mod operations;

pub use config::EngineConfig;
pub use document::Schematic;
pub use error::{Result, WirenetError};
