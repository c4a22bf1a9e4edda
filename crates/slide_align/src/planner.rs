use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    error::{AlignError, Result},
    types::{DragPlan, Position, Waypoint},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlannerConfig {
    /// Interpolated moves for the coarse leg
    #[schemars(range(min = 1))]
    pub coarse_steps: u32,
    /// Interpolated moves for the fine correction leg
    #[schemars(range(min = 1))]
    pub fine_steps: u32,
    /// Share of the horizontal delta covered by the coarse leg
    #[schemars(range(min = 0.0, max = 1.0))]
    pub coarse_ratio: f64,
    /// Vertical offset of the coarse waypoint from the pointer's height; the
    /// fine leg returns to the pointer's height
    pub coarse_y_offset: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            coarse_steps: 25,
            fine_steps: 5,
            coarse_ratio: 0.9,
            coarse_y_offset: 0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.coarse_steps == 0 || self.fine_steps == 0 {
            return Err(AlignError::InvalidConfig(
                "coarse and fine step counts must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.coarse_ratio) {
            return Err(AlignError::InvalidConfig(format!(
                "coarse ratio {} is outside [0, 1]",
                self.coarse_ratio
            )));
        }
        Ok(())
    }
}

/// Turns piece and gap positions into a two-leg drag
#[derive(Debug, Clone, Default)]
pub struct AlignmentPlanner {
    config: PlannerConfig,
}

impl AlignmentPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a drag that starts at `pointer` and moves the piece onto the gap.
    ///
    /// The coarse leg covers most of the horizontal delta; the fine leg closes
    /// what remains as predicted from the initial piece position. Only the
    /// coarse waypoint leaves the pointer's height, by `coarse_y_offset`. Use
    /// [`DragPlan::refine`] once the piece has been measured again after the
    /// coarse leg.
    pub fn plan(&self, piece: Position, gap: Position, pointer: Position) -> Result<DragPlan> {
        for p in [piece, gap, pointer] {
            if !p.is_non_negative() {
                return Err(AlignError::InvalidPosition { x: p.x, y: p.y });
            }
        }

        let delta = gap.x - piece.x;
        let coarse_delta = (f64::from(delta) * self.config.coarse_ratio).round() as i32;

        Ok(DragPlan {
            start: Waypoint {
                x: pointer.x,
                y: pointer.y,
                steps: self.config.coarse_steps,
            },
            coarse: Waypoint {
                x: pointer.x + coarse_delta,
                y: pointer.y + self.config.coarse_y_offset,
                steps: self.config.fine_steps,
            },
            fine: Waypoint {
                x: pointer.x + delta,
                y: pointer.y,
                steps: 0,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> AlignmentPlanner {
        AlignmentPlanner::default()
    }

    #[test]
    fn test_coarse_then_fine() {
        let piece = Position::new(50, 40);
        let gap = Position::new(120, 40);
        let plan = planner().plan(piece, gap, Position::new(50, 40)).expect("Should plan");

        assert!((piece.x..=gap.x).contains(&plan.coarse.x));
        let after_coarse = (gap.x - plan.coarse.x).abs();
        let after_fine = (gap.x - plan.fine.x).abs();
        assert!(after_fine < after_coarse);
        assert_eq!(plan.start.steps, 25);
        assert_eq!(plan.coarse.steps, 5);
    }

    #[test]
    fn test_converged_plan_has_no_correction() {
        let p = Position::new(77, 31);
        let plan = planner().plan(p, p, Position::new(200, 300)).expect("Should plan");
        assert_eq!(plan.fine_delta(), (0, 0));
        assert_eq!(plan.coarse.position(), plan.start.position());
    }

    #[test]
    fn test_leftward_drag() {
        let plan = planner()
            .plan(Position::new(120, 10), Position::new(20, 10), Position::new(300, 50))
            .expect("Should plan");
        assert_eq!(plan.coarse.x, 210);
        assert_eq!(plan.fine.x, 200);
    }

    #[test]
    fn test_pointer_height_is_kept() {
        let plan = planner()
            .plan(Position::new(10, 12), Position::new(90, 40), Position::new(30, 500))
            .expect("Should plan");
        assert!(plan.waypoints().iter().all(|w| w.y == 500));
    }

    #[test]
    fn test_coarse_y_offset_only_moves_coarse_waypoint() {
        let config = PlannerConfig { coarse_y_offset: -7, ..PlannerConfig::default() };
        let plan = AlignmentPlanner::new(config)
            .expect("Should build")
            .plan(Position::new(10, 12), Position::new(90, 40), Position::new(30, 500))
            .expect("Should plan");

        assert_eq!(plan.start.y, 500);
        assert_eq!(plan.coarse.y, 493);
        assert_eq!(plan.fine.y, 500);
        assert_eq!(plan.fine_delta(), (8, 7));
    }

    #[test]
    fn test_negative_input() {
        let err = planner()
            .plan(Position::new(-1, 0), Position::new(10, 0), Position::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, AlignError::InvalidPosition { x: -1, y: 0 }));
    }

    #[test]
    fn test_invalid_config() {
        let config = PlannerConfig { fine_steps: 0, ..PlannerConfig::default() };
        assert!(AlignmentPlanner::new(config).is_err());
        let config = PlannerConfig { coarse_ratio: 1.2, ..PlannerConfig::default() };
        assert!(AlignmentPlanner::new(config).is_err());
    }
}
