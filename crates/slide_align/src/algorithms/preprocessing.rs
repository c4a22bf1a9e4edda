use image::GrayImage;
use imageproc::distance_transform::Norm;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use crate::{error::{AlignError, Result}, traits::ImagePreprocessor, types::Bitmap};

/// Collapse the colour channels of a bitmap into a single luma channel
pub fn to_grayscale(bitmap: &Bitmap) -> GrayImage {
    image::imageops::grayscale(bitmap)
}

/// Fixed-level binarization
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
    /// Emit 255 for pixels at or below the threshold instead of above it
    pub invert: bool,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self {
            threshold: 127,
            invert: false,
        }
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut binary = imageproc::contrast::threshold(image, self.threshold);
        if self.invert {
            image::imageops::invert(&mut binary);
        }
        Ok(binary)
    }

    fn name(&self) -> &'static str {
        if self.invert { "threshold_inv" } else { "threshold" }
    }
}

/// Swaps foreground and background of a binary image
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertPreprocessor;

impl ImagePreprocessor for InvertPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut inverted = image.clone();
        image::imageops::invert(&mut inverted);
        Ok(inverted)
    }

    fn name(&self) -> &'static str {
        "invert"
    }
}

/// Basic morphological operation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MorphOp {
    Erode,
    Dilate,
}

/// Erosion or dilation with a square structuring element
#[derive(Debug, Clone)]
pub struct MorphologyPreprocessor {
    pub op: MorphOp,
    /// Side of the square kernel, odd
    pub kernel_size: u32,
    /// Number of times the operation is applied; zero leaves the image unchanged
    pub iterations: u32,
}

impl MorphologyPreprocessor {
    pub fn new(op: MorphOp, kernel_size: u32, iterations: u32) -> Self {
        Self { op, kernel_size, iterations }
    }

    /// Chebyshev radius equivalent to the square kernel
    fn radius(&self) -> Result<u8> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(AlignError::InvalidConfig(format!(
                "kernel size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        u8::try_from((self.kernel_size - 1) / 2).map_err(|_| {
            AlignError::InvalidConfig(format!("kernel size {} is too large", self.kernel_size))
        })
    }
}

impl ImagePreprocessor for MorphologyPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let radius = self.radius()?;
        let mut output = image.clone();
        if radius == 0 {
            return Ok(output);
        }
        for _ in 0..self.iterations {
            output = match self.op {
                MorphOp::Erode => imageproc::morphology::erode(&output, Norm::LInf, radius),
                MorphOp::Dilate => imageproc::morphology::dilate(&output, Norm::LInf, radius),
            };
        }
        Ok(output)
    }

    fn name(&self) -> &'static str {
        match self.op {
            MorphOp::Erode => "erode",
            MorphOp::Dilate => "dilate",
        }
    }
}
