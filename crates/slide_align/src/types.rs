use image::{GrayImage, RgbaImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Decoded RGBA raster. Width, height and buffer length are kept consistent by `image`.
pub type Bitmap = RgbaImage;

/// Single-channel image whose pixels are either 0 or 255 once thresholded.
pub type Mask = GrayImage;

/// Integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_non_negative(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Outline of one connected foreground region, in tracing order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contour {
    pub points: Vec<Position>,
}

impl Contour {
    pub fn new(points: Vec<Position>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inclusive bounding box as `(min, max)`, or `None` for an empty contour.
    pub fn bounding_box(&self) -> Option<(Position, Position)> {
        let first = *self.points.first()?;
        let bounds = self.points.iter().fold((first, first), |(min, max), p| {
            (
                Position::new(min.x.min(p.x), min.y.min(p.y)),
                Position::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(bounds)
    }
}

/// Zeroth and first order spatial moments of a region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Centroid floored to whole pixels, `None` when the area is zero.
    pub fn centroid(&self) -> Option<Position> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Position::new(
            (self.m10 / self.m00).floor() as i32,
            (self.m01 / self.m00).floor() as i32,
        ))
    }
}

/// A contour together with the moments of the area it encloses.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub contour: Contour,
    pub moments: Moments,
}

/// A pointer waypoint and the number of interpolated moves used to reach the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
    pub steps: u32,
}

impl Waypoint {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Pointer path for one drag: press at `start`, travel to `coarse`, then correct to `fine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DragPlan {
    pub start: Waypoint,
    pub coarse: Waypoint,
    pub fine: Waypoint,
}

impl DragPlan {
    pub fn waypoints(&self) -> [Waypoint; 3] {
        [self.start, self.coarse, self.fine]
    }

    /// Offset applied by the fine correction leg.
    pub fn fine_delta(&self) -> (i32, i32) {
        (self.fine.x - self.coarse.x, self.fine.y - self.coarse.y)
    }

    /// Recompute the fine leg from the piece position measured after the coarse move.
    pub fn refine(&self, measured_piece: Position, gap: Position) -> DragPlan {
        let residual = gap.x - measured_piece.x;
        DragPlan {
            fine: Waypoint {
                x: self.coarse.x + residual,
                ..self.fine
            },
            ..self.clone()
        }
    }
}

/// Result of analysing one set of captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Solution {
    pub gap_position: Position,
    pub piece_position: Position,
    pub drag_plan: DragPlan,
}

/// Encoded canvases of a challenge widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedImages {
    /// Background without the gap cut out.
    pub reference: Vec<u8>,
    /// Background with the gap the piece must fill.
    pub challenge: Vec<u8>,
    /// Transparent layer holding only the draggable piece.
    pub piece: Vec<u8>,
}
