use ep_core::EpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] EpError),

    #[error("engine configuration error: {0}")]
    Config(String),

    #[error("{what}: expected {expected}, got {got}")]
    ShapeMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("failed to build the worker pool: {0}")]
    ThreadPool(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
