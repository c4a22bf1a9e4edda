//! # Slider Puzzle Alignment Library
//!
//! Finds where the piece of a slider puzzle has to go and plans the pointer
//! drag that puts it there.
//!
//! ## Core Features
//!
//! - **Perceptual diff**: YIQ colour distance with anti-aliasing detection
//! - **Trait-based pipeline**: threshold and morphology stages composed with a builder
//! - **Contour centroids**: outer contours, region selection and spatial moments
//! - **Two-leg drag planning**: a coarse move followed by a measured correction
//! - **Async orchestration**: capture, drag and verification behind collaborator traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slide_align::{CapturedImages, Position, Solver, SolverConfig};
//!
//! let solver = Solver::new(SolverConfig::default())?;
//! let images = CapturedImages {
//!     reference: std::fs::read("original.png")?,
//!     challenge: std::fs::read("captcha.png")?,
//!     piece: std::fs::read("puzzle.png")?,
//! };
//!
//! let solution = solver.solve(&images, Position::new(420, 610))?;
//! println!("gap at {:?}, drag {:?}", solution.gap_position, solution.drag_plan);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust
//! use slide_align::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .with_threshold(127, false)
//!     .with_dilate(5, 1)
//!     .with_erode(5, 1)
//!     .build();
//! assert_eq!(pipeline.info(), "Pipeline: threshold -> dilate -> erode -> contours");
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod estimator;
pub mod planner;
pub mod config;
pub mod solver;
pub mod orchestrator;

// Re-exports for convenience
pub use error::{AlignError, Result};
pub use types::*;
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder, MorphPipeline, PipelineVariant};
pub use estimator::{estimate, ContourPositionEstimator};
pub use planner::{AlignmentPlanner, PlannerConfig};
pub use config::{SolverConfig, TimingConfig};
pub use solver::Solver;
pub use orchestrator::{
    AttemptOutcome, CaptchaSolverOrchestrator, CaptureProvider, PointerDriver, VerificationObserver,
};
