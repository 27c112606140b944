use thiserror::Error;

pub type StarfieldResult<T> = Result<T, StarfieldError>;

/// Failures that can happen while wiring the engine to a host page.
///
/// None of these ever escape `start`, `stop` or a frame tick: construction
/// failures make the engine inert and config failures fall back to defaults.
#[derive(Error, Debug)]
pub enum StarfieldError {
    #[error("no global window")]
    NoWindow,

    #[error("canvas context request failed: {0}")]
    ContextRequest(String),

    #[error("canvas has no 2d context")]
    NoContext,

    #[error("invalid starfield config: {0}")]
    Config(#[from] serde_json::Error),
}
