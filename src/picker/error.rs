use thiserror::Error;

/// Failures surfaced synchronously by pick requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("a pick operation is already in progress")]
    Busy,

    #[error("file picker is not available in this session")]
    Unavailable,

    #[error("browse mode returns no selection, use open_folder instead")]
    BrowseNotPickable,

    #[error("failed to launch picker helper: {0}")]
    Launch(String),
}
