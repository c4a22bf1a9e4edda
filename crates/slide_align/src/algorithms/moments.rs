use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use crate::types::{Contour, Moments, Position};

/// How the moments of a contour are measured
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MomentMethod {
    /// Sum over every pixel enclosed by the contour, boundary included.
    /// `m00` is the pixel count of the region.
    #[default]
    Region,
    /// Green's theorem over the contour polygon through the boundary pixel centres.
    /// Regions one pixel thick have zero area.
    Polygon,
}

impl MomentMethod {
    pub fn compute(&self, contour: &Contour) -> Moments {
        match self {
            Self::Region => region_moments(contour),
            Self::Polygon => polygon_moments(contour),
        }
    }
}

fn region_moments(contour: &Contour) -> Moments {
    let Some((min, max)) = contour.bounding_box() else {
        return Moments::default();
    };

    let mut moments = Moments::default();
    for y in min.y..=max.y {
        for x in min.x..=max.x {
            if encloses(&contour.points, Position::new(x, y)) {
                moments.m00 += 1.0;
                moments.m10 += f64::from(x);
                moments.m01 += f64::from(y);
            }
        }
    }
    moments
}

fn polygon_moments(contour: &Contour) -> Moments {
    let points = &contour.points;
    let n = points.len();
    let mut m00 = 0.0;
    let mut m10 = 0.0;
    let mut m01 = 0.0;

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let (ax, ay) = (f64::from(a.x), f64::from(a.y));
        let (bx, by) = (f64::from(b.x), f64::from(b.y));
        let cross = ax * by - bx * ay;
        m00 += cross;
        m10 += (ax + bx) * cross;
        m01 += (ay + by) * cross;
    }

    let mut moments = Moments {
        m00: m00 / 2.0,
        m10: m10 / 6.0,
        m01: m01 / 6.0,
    };
    // Orientation of the trace decides the sign
    if moments.m00 < 0.0 {
        moments.m00 = -moments.m00;
        moments.m10 = -moments.m10;
        moments.m01 = -moments.m01;
    }
    moments
}

/// Point-in-polygon test that counts points on the outline as inside
fn encloses(polygon: &[Position], p: Position) -> bool {
    let n = polygon.len();
    let mut inside = false;

    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if on_segment(p, a, b) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let t = f64::from(p.y - a.y) / f64::from(b.y - a.y);
            let crossing_x = f64::from(a.x) + t * f64::from(b.x - a.x);
            if f64::from(p.x) < crossing_x {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_segment(p: Position, a: Position, b: Position) -> bool {
    let cross = i64::from(b.x - a.x) * i64::from(p.y - a.y)
        - i64::from(b.y - a.y) * i64::from(p.x - a.x);
    cross == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}
