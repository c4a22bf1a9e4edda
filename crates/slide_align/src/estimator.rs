//! Locates the dominant foreground shape of a bitmap and reports its centroid.

use image::GrayImage;
use tracing::debug;
use crate::{
    algorithms::{to_grayscale, MomentMethod, RegionSelection},
    error::{AlignError, Result},
    pipeline::{builder::PipelineBuilder, MorphPipeline, Pipeline},
    traits::RegionSelector,
    types::{Bitmap, Position, Region},
};

/// Grayscale, binarize, clean up, extract outer contours, pick one, take its centroid
pub struct ContourPositionEstimator {
    pipeline: Pipeline,
    selection: RegionSelection,
    moments: MomentMethod,
}

impl ContourPositionEstimator {
    pub fn new(config: &MorphPipeline, selection: RegionSelection, moments: MomentMethod) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: PipelineBuilder::from_config(config),
            selection,
            moments,
        })
    }

    /// Centroid of the selected region
    pub fn estimate(&self, bitmap: &Bitmap) -> Result<Position> {
        self.estimate_with_moments(bitmap).map(|(position, _)| position)
    }

    /// Centroid together with the region it was computed from
    pub fn estimate_with_moments(&self, bitmap: &Bitmap) -> Result<(Position, Region)> {
        self.estimate_gray(&to_grayscale(bitmap))
    }

    /// Same as [`Self::estimate_with_moments`] for an image that is already single-channel
    pub fn estimate_gray(&self, image: &GrayImage) -> Result<(Position, Region)> {
        let contours = self.pipeline.process(image)?;
        let no_region = || AlignError::NoRegionFound {
            width: image.width(),
            height: image.height(),
        };
        if contours.is_empty() {
            return Err(no_region());
        }
        let candidate_count = contours.len();

        let candidates = contours
            .into_iter()
            .map(|contour| {
                let moments = self.moments.compute(&contour);
                Region { contour, moments }
            })
            .collect();

        let region = self.selection.select(candidates).ok_or_else(no_region)?;
        let position = region.moments.centroid().ok_or(AlignError::DegenerateRegion)?;

        debug!(
            candidates = candidate_count,
            area = region.moments.m00,
            x = position.x,
            y = position.y,
            "estimated region centroid"
        );

        Ok((position, region))
    }
}

/// Estimate a position with the default region selection and moment method
pub fn estimate(bitmap: &Bitmap, pipeline: &MorphPipeline) -> Result<Position> {
    ContourPositionEstimator::new(pipeline, RegionSelection::default(), MomentMethod::default())?
        .estimate(bitmap)
}
