use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Image dimensions differ: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    #[error("No region found after processing a {width}x{height} image")]
    NoRegionFound { width: u32, height: u32 },

    #[error("Selected region has zero area")]
    DegenerateRegion,

    #[error("Success indicator did not appear within {timeout_ms} ms")]
    VerificationTimeout { timeout_ms: u64 },

    #[error("Invalid position ({x}, {y}): coordinates must be non-negative")]
    InvalidPosition { x: i32, y: i32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Pointer driver failed: {0}")]
    Pointer(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AlignError {
    /// Whether a fresh capture is likely to succeed where this attempt failed.
    ///
    /// Vision failures usually come from a canvas caught mid-render, so they are
    /// worth another try. Malformed input and configuration mistakes are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoRegionFound { .. } | Self::DegenerateRegion | Self::Capture(_)
        )
    }
}

impl From<image::ImageError> for AlignError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AlignError>;
