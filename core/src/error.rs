use thiserror::Error;

/// Errors returned by controller operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine has been disposed")]
    Disposed,
    #[error("no suggestions are displayed")]
    NotDisplaying,
    #[error("suggestion index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },
}
