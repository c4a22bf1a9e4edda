use image::GrayImage;
use crate::{error::Result, types::{Contour, Region}};

/// Trait for single-channel image stages (threshold, erode, dilate)
pub trait ImagePreprocessor: Send + Sync {
    /// Transform the input image into a new one
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;

    /// Short label used in logs and pipeline descriptions
    fn name(&self) -> &'static str;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract the outer contours of a binary image, in extraction order
    fn extract_contours(&self, image: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for picking the region whose centroid becomes the estimated position
pub trait RegionSelector: Send + Sync {
    /// Pick one region, or `None` when no candidate qualifies
    fn select(&self, candidates: Vec<Region>) -> Option<Region>;
}
