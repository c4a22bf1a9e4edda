use tracing::{debug, info};
use crate::{
    algorithms::{decode, diff, DiffResult},
    config::SolverConfig,
    error::Result,
    estimator::ContourPositionEstimator,
    pipeline::PipelineVariant,
    planner::AlignmentPlanner,
    types::{Bitmap, CapturedImages, Position, Solution},
};

/// Everything needed to turn captures into a [`Solution`], built once per configuration
pub struct Solver {
    config: SolverConfig,
    gap_estimator: ContourPositionEstimator,
    piece_estimator: ContourPositionEstimator,
    planner: AlignmentPlanner,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gap_estimator: config.estimator(PipelineVariant::Gap)?,
            piece_estimator: config.estimator(PipelineVariant::Piece)?,
            planner: AlignmentPlanner::new(config.planner.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn planner(&self) -> &AlignmentPlanner {
        &self.planner
    }

    /// Paint where the challenge differs from the reference
    pub fn diff(&self, reference: &Bitmap, challenge: &Bitmap) -> Result<DiffResult> {
        diff(reference, challenge, &self.config.diff)
    }

    /// Centroid of the gap cut into the challenge background.
    ///
    /// Reads the difference mask rather than the painted diff image, so the
    /// paint colours and fading have no effect on the result.
    pub fn locate_gap(&self, reference: &Bitmap, challenge: &Bitmap) -> Result<Position> {
        let difference = self.diff(reference, challenge)?;
        self.gap_estimator
            .estimate_gray(&difference.luma())
            .map(|(position, _)| position)
    }

    /// Centroid of the draggable piece on its own canvas
    pub fn locate_piece(&self, piece: &Bitmap) -> Result<Position> {
        self.piece_estimator.estimate(piece)
    }

    /// Decode the captures and solve them
    pub fn solve(&self, images: &CapturedImages, pointer: Position) -> Result<Solution> {
        let reference = decode(&images.reference)?;
        let challenge = decode(&images.challenge)?;
        let piece = decode(&images.piece)?;
        self.solve_bitmaps(&reference, &challenge, &piece, pointer)
    }

    /// Locate gap and piece and plan the drag starting from `pointer`
    pub fn solve_bitmaps(
        &self,
        reference: &Bitmap,
        challenge: &Bitmap,
        piece: &Bitmap,
        pointer: Position,
    ) -> Result<Solution> {
        let gap_position = self.locate_gap(reference, challenge)?;
        debug!(x = gap_position.x, y = gap_position.y, "gap located");

        let piece_position = self.locate_piece(piece)?;
        debug!(x = piece_position.x, y = piece_position.y, "piece located");

        let drag_plan = self.planner.plan(piece_position, gap_position, pointer)?;
        info!(
            gap_x = gap_position.x,
            piece_x = piece_position.x,
            coarse_x = drag_plan.coarse.x,
            fine_x = drag_plan.fine.x,
            "planned drag"
        );

        Ok(Solution {
            gap_position,
            piece_position,
            drag_plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::encode_png, error::AlignError};
    use image::Rgba;

    const BACKGROUND: Rgba<u8> = Rgba([200, 200, 200, 255]);

    fn reference() -> Bitmap {
        Bitmap::from_pixel(120, 60, BACKGROUND)
    }

    fn challenge() -> Bitmap {
        Bitmap::from_fn(120, 60, |x, y| {
            if (70..=85).contains(&x) && (20..=35).contains(&y) {
                Rgba([40, 40, 40, 255])
            } else {
                BACKGROUND
            }
        })
    }

    fn piece() -> Bitmap {
        Bitmap::from_fn(120, 60, |x, y| {
            if (10..=25).contains(&x) && (20..=35).contains(&y) {
                Rgba([230, 230, 230, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    fn solver() -> Solver {
        Solver::new(SolverConfig::default()).expect("Default config should build")
    }

    #[test]
    fn test_locate_gap() {
        let gap = solver().locate_gap(&reference(), &challenge()).expect("Should locate gap");
        assert_eq!(gap, Position::new(77, 27));
    }

    #[test]
    fn test_locate_piece() {
        let piece = solver().locate_piece(&piece()).expect("Should locate piece");
        assert_eq!(piece, Position::new(17, 27));
    }

    #[test]
    fn test_solve_encoded_images() {
        let images = CapturedImages {
            reference: encode_png(&reference()).expect("Should encode"),
            challenge: encode_png(&challenge()).expect("Should encode"),
            piece: encode_png(&piece()).expect("Should encode"),
        };
        let solution = solver().solve(&images, Position::new(200, 300)).expect("Should solve");

        assert_eq!(solution.gap_position, Position::new(77, 27));
        assert_eq!(solution.piece_position, Position::new(17, 27));
        assert_eq!(solution.drag_plan.coarse.x, 254);
        assert_eq!(solution.drag_plan.fine.x, 260);
    }

    #[test]
    fn test_gap_with_unchanged_column_stays_whole() {
        let reference = Bitmap::from_pixel(120, 60, BACKGROUND);
        let challenge = Bitmap::from_fn(120, 60, |x, y| {
            let inside = (60..=79).contains(&x) && (20..=39).contains(&y);
            if inside && x != 66 { Rgba([40, 40, 40, 255]) } else { BACKGROUND }
        });

        let gap = solver().locate_gap(&reference, &challenge).expect("Should locate gap");
        assert_eq!(gap, Position::new(69, 29));
    }

    #[test]
    fn test_gap_independent_of_diff_paint() {
        let dark = Rgba([60, 60, 60, 255]);
        let reference = Bitmap::from_pixel(120, 60, dark);
        let challenge = Bitmap::from_fn(120, 60, |x, y| {
            if (60..=79).contains(&x) && (20..=39).contains(&y) {
                Rgba([230, 230, 230, 255])
            } else {
                dark
            }
        });

        let mut config = SolverConfig::default();
        config.diff.alpha = 0.6;
        let solver = Solver::new(config).expect("Should build");

        assert_eq!(solver.diff(&reference, &challenge).expect("Should diff").different_pixels, 400);
        let gap = solver.locate_gap(&reference, &challenge).expect("Should locate gap");
        assert_eq!(gap, Position::new(69, 29));
    }

    #[test]
    fn test_no_gap_in_identical_images() {
        let err = solver().locate_gap(&reference(), &reference()).unwrap_err();
        assert!(matches!(err, AlignError::NoRegionFound { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_undecodable_capture() {
        let images = CapturedImages {
            reference: b"junk".to_vec(),
            ..CapturedImages::default()
        };
        let err = solver().solve(&images, Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, AlignError::Decode(_)));
    }
}
