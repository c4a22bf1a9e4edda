use image::GrayImage;
use imageproc::contours::BorderType;
use crate::{error::Result, traits::ContourExtractor, types::{Contour, Position}};

/// Imageproc-based extractor returning outer borders only, compressed to their corner points
#[derive(Debug, Clone, Default)]
pub struct ExternalContourExtractor;

impl ContourExtractor for ExternalContourExtractor {
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<Vec<Contour>> {
        let contours = imageproc::contours::find_contours::<i32>(binary_image);

        let result = contours
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
            .map(|contour| {
                let points = contour
                    .points
                    .iter()
                    .map(|p| Position::new(p.x, p.y))
                    .collect();
                compress_chain(points)
            })
            .filter(|contour| !contour.is_empty())
            .collect();

        Ok(result)
    }
}

/// Drop points lying in the middle of a straight horizontal, vertical or diagonal run.
///
/// The contour is closed, so the first and last points are checked against each other.
pub fn compress_chain(mut points: Vec<Position>) -> Contour {
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Contour::new(points);
    }

    let n = points.len();
    let kept = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let (ax, ay) = (cur.x - prev.x, cur.y - prev.y);
            let (bx, by) = (next.x - cur.x, next.y - cur.y);
            let colinear = ax * by - ay * bx == 0 && ax * bx + ay * by > 0;
            !colinear
        })
        .map(|i| points[i])
        .collect();

    Contour::new(kept)
}
