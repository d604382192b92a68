use thiserror::Error;

/// Top-level error type for the wirenet engine.
#[derive(Debug, Error)]
pub enum WirenetError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length segment at ({x}, {y})")]
    ZeroLength { x: i64, y: i64 },
}

/// Errors related to entity lookup in the net store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("entity is not placed in the drawing: {0}")]
    Detached(String),
}

/// Errors related to net and bus name syntax.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty net name")]
    Empty,

    #[error("malformed bus notation: {0:?}")]
    MalformedBus(String),

    #[error("invalid character in net name: {0:?}")]
    InvalidCharacter(String),

    #[error("bus range of {name:?} spans {width} bits")]
    RangeTooWide { name: String, width: u64 },
}

/// Errors related to engine operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to the mutation log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("macro {open:?} is still open; nested macros are not supported")]
    NestedMacro { open: String },

    #[error("no macro is open")]
    NoOpenMacro,
}

/// Convenience type alias for results using [`WirenetError`].
pub type Result<T> = std::result::Result<T, WirenetError>;
