use crate::{
    pipeline::{MorphPipeline, Pipeline},
    traits::{ImagePreprocessor, ContourExtractor},
    algorithms::{
        ExternalContourExtractor,
        InvertPreprocessor,
        MorphOp,
        MorphologyPreprocessor,
        ThresholdPreprocessor,
    },
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            contour_extractor: None,
        }
    }

    /// Add a preprocessor to the pipeline
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Add a fixed-level threshold step
    pub fn with_threshold(self, threshold: u8, invert: bool) -> Self {
        self.add_preprocessor(ThresholdPreprocessor { threshold, invert })
    }

    /// Add an erosion with a square kernel
    pub fn with_erode(self, kernel_size: u32, iterations: u32) -> Self {
        self.add_preprocessor(MorphologyPreprocessor::new(MorphOp::Erode, kernel_size, iterations))
    }

    /// Add a dilation with a square kernel
    pub fn with_dilate(self, kernel_size: u32, iterations: u32) -> Self {
        self.add_preprocessor(MorphologyPreprocessor::new(MorphOp::Dilate, kernel_size, iterations))
    }

    /// Swap foreground and background
    pub fn with_invert(self) -> Self {
        self.add_preprocessor(InvertPreprocessor)
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let contour_extractor = self.contour_extractor
            .unwrap_or_else(|| Box::new(ExternalContourExtractor));

        Pipeline::new(self.preprocessors, contour_extractor)
    }

    /// Build the threshold and morphology sequence described by a configuration
    pub fn from_config(config: &MorphPipeline) -> Pipeline {
        let invert_late = config.invert && config.invert_after_morphology;
        let builder = config.operations.iter().fold(
            Self::new().with_threshold(config.threshold, config.invert && !invert_late),
            |builder, op| match op {
                MorphOp::Erode => builder.with_erode(config.kernel_size, config.iterations),
                MorphOp::Dilate => builder.with_dilate(config.kernel_size, config.iterations),
            },
        );
        if invert_late {
            builder.with_invert().build()
        } else {
            builder.build()
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
