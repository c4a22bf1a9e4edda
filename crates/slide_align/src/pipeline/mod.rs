pub mod builder;
pub mod variant;

pub use variant::{MorphPipeline, PipelineVariant};

use image::GrayImage;
use tracing::trace;
use crate::{
    error::Result,
    types::Contour,
    traits::{ImagePreprocessor, ContourExtractor},
};

/// Binarization and morphology stages followed by contour extraction
pub struct Pipeline {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Box<dyn ContourExtractor>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        contour_extractor: Box<dyn ContourExtractor>,
    ) -> Self {
        Self {
            preprocessors,
            contour_extractor,
        }
    }

    /// Run every preprocessor in order and return the resulting binary image
    pub fn binarize(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut processed_image = image.clone();
        for preprocessor in &self.preprocessors {
            processed_image = preprocessor.preprocess(&processed_image)?;
            trace!(
                stage = preprocessor.name(),
                foreground = processed_image.pixels().filter(|p| p[0] != 0).count(),
                "applied pipeline stage"
            );
        }
        Ok(processed_image)
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &GrayImage) -> Result<Vec<Contour>> {
        let binary_image = self.binarize(image)?;
        self.contour_extractor.extract_contours(&binary_image)
    }

    /// Stage names joined in execution order
    pub fn info(&self) -> String {
        let stages: Vec<&str> = self.preprocessors.iter().map(|p| p.name()).collect();
        format!("Pipeline: {} -> contours", stages.join(" -> "))
    }
}
