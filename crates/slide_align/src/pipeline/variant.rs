use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use crate::{algorithms::MorphOp, error::{AlignError, Result}};

/// The two shapes located during a solve
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineVariant {
    /// Gap in the background, found in the diff image
    Gap,
    /// Draggable piece, found in its own transparent canvas
    Piece,
}

/// Binarize-then-morphology settings for one pipeline variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MorphPipeline {
    /// Grey level separating the two classes
    pub threshold: u8,
    /// Treat pixels at or below `threshold` as foreground
    pub invert: bool,
    /// Apply the inversion as the last stage, so morphology runs on the
    /// light class. Erode then grows the dark foreground and dilate shrinks it.
    #[serde(default)]
    pub invert_after_morphology: bool,
    /// Side of the square structuring element; odd
    #[schemars(range(min = 1, max = 511))]
    pub kernel_size: u32,
    /// Applications of each operation; 0 disables morphology
    pub iterations: u32,
    /// Operations applied in order after binarization
    pub operations: Vec<MorphOp>,
}

impl MorphPipeline {
    /// Diff images mark differences in a dark colour on a light background. The
    /// morphology runs before the inversion, which closes unchanged streaks
    /// inside the gap twice.
    pub fn gap() -> Self {
        Self {
            threshold: 150,
            invert: true,
            invert_after_morphology: true,
            kernel_size: 5,
            iterations: 1,
            operations: vec![MorphOp::Erode, MorphOp::Dilate, MorphOp::Erode, MorphOp::Dilate],
        }
    }

    /// The piece is bright on a transparent (black) layer. Closing fills dark
    /// texture inside its outline.
    pub fn piece() -> Self {
        Self {
            threshold: 127,
            invert: false,
            invert_after_morphology: false,
            kernel_size: 5,
            iterations: 1,
            operations: vec![MorphOp::Dilate, MorphOp::Erode],
        }
    }

    pub fn for_variant(variant: PipelineVariant) -> Self {
        match variant {
            PipelineVariant::Gap => Self::gap(),
            PipelineVariant::Piece => Self::piece(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 || self.kernel_size > 511 {
            return Err(AlignError::InvalidConfig(format!(
                "kernel size must be odd and within 1..=511, got {}",
                self.kernel_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_variants_have_distinct_orders() {
        assert_eq!(
            MorphPipeline::gap().operations,
            vec![MorphOp::Erode, MorphOp::Dilate, MorphOp::Erode, MorphOp::Dilate]
        );
        assert_eq!(MorphPipeline::piece().operations, vec![MorphOp::Dilate, MorphOp::Erode]);
        assert!(MorphPipeline::gap().invert && MorphPipeline::gap().invert_after_morphology);
        assert!(!MorphPipeline::piece().invert);
    }

    #[test]
    fn test_every_variant_validates() {
        for variant in PipelineVariant::iter() {
            MorphPipeline::for_variant(variant)
                .validate()
                .unwrap_or_else(|e| panic!("{variant} should validate: {e}"));
        }
    }

    #[test]
    fn test_invalid_kernel() {
        let pipeline = MorphPipeline { kernel_size: 6, ..MorphPipeline::piece() };
        assert!(matches!(pipeline.validate(), Err(AlignError::InvalidConfig(_))));
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(PipelineVariant::Gap.to_string(), "gap");
        assert_eq!("piece".parse::<PipelineVariant>().ok(), Some(PipelineVariant::Piece));
    }
}
