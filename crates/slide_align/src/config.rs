use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    algorithms::{DiffOptions, MomentMethod, RegionSelection},
    error::{AlignError, Result},
    estimator::ContourPositionEstimator,
    pipeline::{MorphPipeline, PipelineVariant},
    planner::PlannerConfig,
};

/// Waits around the drag, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimingConfig {
    /// How long to wait for the success indicator after release
    pub verification_timeout_ms: u64,
    /// Interval between captures while waiting for a canvas to stop changing
    pub settle_poll_ms: u64,
    /// Upper bound on waiting for a canvas to stop changing
    pub settle_max_wait_ms: u64,
    /// Pause after the coarse leg before the piece is measured again
    pub remeasure_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            verification_timeout_ms: 5000,
            settle_poll_ms: 100,
            settle_max_wait_ms: 1000,
            remeasure_delay_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn verification_timeout(&self) -> Duration {
        Duration::from_millis(self.verification_timeout_ms)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    pub fn settle_max_wait(&self) -> Duration {
        Duration::from_millis(self.settle_max_wait_ms)
    }

    pub fn remeasure_delay(&self) -> Duration {
        Duration::from_millis(self.remeasure_delay_ms)
    }
}

/// Every tunable of a solve. Missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SolverConfig {
    pub diff: DiffOptions,
    pub gap: MorphPipeline,
    pub piece: MorphPipeline,
    pub selection: RegionSelection,
    pub moments: MomentMethod,
    pub planner: PlannerConfig,
    pub timing: TimingConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            diff: DiffOptions::default(),
            gap: MorphPipeline::gap(),
            piece: MorphPipeline::piece(),
            selection: RegionSelection::default(),
            moments: MomentMethod::default(),
            planner: PlannerConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Use the same kernel and iteration count for both pipelines
    pub fn with_morphology(mut self, kernel_size: u32, iterations: u32) -> Self {
        for pipeline in [&mut self.gap, &mut self.piece] {
            pipeline.kernel_size = kernel_size;
            pipeline.iterations = iterations;
        }
        self
    }

    pub fn pipeline(&self, variant: PipelineVariant) -> &MorphPipeline {
        match variant {
            PipelineVariant::Gap => &self.gap,
            PipelineVariant::Piece => &self.piece,
        }
    }

    pub fn estimator(&self, variant: PipelineVariant) -> Result<ContourPositionEstimator> {
        ContourPositionEstimator::new(self.pipeline(variant), self.selection.clone(), self.moments)
    }

    pub fn validate(&self) -> Result<()> {
        self.diff.validate()?;
        self.gap.validate()?;
        self.piece.validate()?;
        self.planner.validate()?;
        if let RegionSelection::LargestArea { min_area } = self.selection {
            if !(min_area >= 0.0) {
                return Err(AlignError::InvalidConfig(format!(
                    "minimum region area {min_area} must be non-negative"
                )));
            }
        }
        if self.timing.settle_poll_ms == 0 {
            return Err(AlignError::InvalidConfig(
                "settle poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: SolverConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SolverConfig)
    }
}
