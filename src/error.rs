use thiserror::Error;

/// Errors raised while turning content into a symbol.
///
/// Either variant aborts generation before any grid is handed back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QrError {
    /// The encoded content does not fit the version-1 data budget.
    ///
    /// Ways to handle this:
    ///
    /// - Shorten the content (at most 17 characters fit).
    /// - Propagate the error upward to the caller/user.
    #[error("content needs {needed} data bits, max capacity = {capacity} bits")]
    CapacityExceeded { needed: usize, capacity: usize },

    /// The content could not be read as text.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while rasterizing or writing a symbol.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("canvas {width}x{height} is too small for {modules} modules")]
    CanvasTooSmall { width: u32, height: u32, modules: u32 },

    #[error(transparent)]
    Encode(#[from] QrError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
