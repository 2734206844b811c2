use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("cell ({row}, {col}) is already occupied")]
    OccupiedCell { row: usize, col: usize },

    #[error("cell ({row}, {col}) is outside the 3x3 board")]
    CellOutOfRange { row: usize, col: usize },

    #[error("invalid cell value {0}, expected -1, 0 or 1")]
    InvalidCellValue(i8),

    #[error("no legal move available")]
    NoLegalMove,

    #[error("malformed value table record on line {line}: expected 10 fields, got {fields}")]
    MalformedStoreRecord { line: usize, fields: usize },

    #[error("invalid state key '{key}' on line {line}")]
    InvalidStoreKey { line: usize, key: String },

    #[error("duplicate state key '{key}' on line {line}")]
    DuplicateStoreKey { line: usize, key: String },

    #[error("invalid score '{value}' on line {line}")]
    InvalidScore { line: usize, value: String },

    #[error("invalid state key '{0}'")]
    InvalidKey(String),

    #[error("score index {0} is out of range 0..9")]
    IndexOutOfRange(usize),

    #[error("input closed before a move was entered")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
