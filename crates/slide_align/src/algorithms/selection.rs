use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{traits::RegionSelector, types::Region};

/// Which extracted region is taken as the located shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RegionSelection {
    /// Whatever region the extractor reported first
    First,
    /// The region with the largest area, ignoring regions smaller than `min_area`
    LargestArea {
        #[schemars(range(min = 0.0))]
        min_area: f64,
    },
}

impl Default for RegionSelection {
    fn default() -> Self {
        Self::LargestArea { min_area: 1.0 }
    }
}

impl RegionSelector for RegionSelection {
    fn select(&self, candidates: Vec<Region>) -> Option<Region> {
        match self {
            Self::First => candidates.into_iter().next(),
            Self::LargestArea { min_area } => candidates
                .into_iter()
                .filter(|region| region.moments.m00 >= *min_area)
                .fold(None, |best: Option<Region>, region| match best {
                    Some(current) if current.moments.m00 >= region.moments.m00 => Some(current),
                    _ => Some(region),
                }),
        }
    }
}
