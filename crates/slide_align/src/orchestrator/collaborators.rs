//! Seams to the browser automation layer.

use async_trait::async_trait;
use crate::{error::Result, types::{CapturedImages, Position}};

/// Reads the rendered canvases of a challenge widget
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    /// Encoded reference, challenge and piece canvases
    async fn capture_challenge(&self) -> Result<CapturedImages>;

    /// Encoded piece canvas only, read again while the piece is being dragged
    async fn capture_piece(&self) -> Result<Vec<u8>>;
}

/// Synthesizes pointer input
#[async_trait]
pub trait PointerDriver: Send + Sync {
    /// Centre of the slider handle in page coordinates
    async fn handle_center(&self) -> Result<Position>;

    /// Move to `(x, y)` through `steps` evenly spaced intermediate events
    async fn move_to(&self, x: i32, y: i32, steps: u32) -> Result<()>;

    async fn down(&self) -> Result<()>;

    async fn up(&self) -> Result<()>;
}

/// Watches for the widget's success indicator
#[async_trait]
pub trait VerificationObserver: Send + Sync {
    /// Resolves once the indicator is visible. It may never resolve; the caller bounds the wait.
    async fn wait_for_success(&self) -> Result<()>;
}
