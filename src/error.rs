use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("update rate must be a positive finite number of Hz, got {0}")]
    UpdateRate(f64),

    #[error("decay factor must lie in (0, 1], got {0}")]
    DecayFactor(f32),

    #[error("decay epsilon must lie in (0, 1), got {0}")]
    DecayEpsilon(f32),

    #[error("cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("unknown pattern `{0}`")]
    UnknownPattern(String),

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("script entry `{0}` is not of the form <frame>:<command>")]
    BadScriptEntry(String),

    #[error("invalid params: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
