//! Drives one solve attempt end to end through the automation collaborators.
//!
//! Ordering matters: the piece is measured again after the coarse leg, because
//! its rendered position lags behind the pointer, and only then is the fine
//! correction applied.

pub mod collaborators;
pub mod readiness;

pub use collaborators::{CaptureProvider, PointerDriver, VerificationObserver};
pub use readiness::wait_until_stable;

use tracing::{info, warn};
use crate::{
    algorithms::decode,
    error::{AlignError, Result},
    solver::Solver,
    types::{CapturedImages, DragPlan, Position, Solution},
};

/// Result of one attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The success indicator appeared
    Solved { solution: Solution, executed: DragPlan },
    /// The drag was performed but no success indicator appeared in time
    Rejected {
        solution: Solution,
        executed: DragPlan,
        reason: String,
    },
    /// The captures could not be analysed; a fresh capture may work
    Retry { reason: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

pub struct CaptchaSolverOrchestrator<C, P, V>
where
    C: CaptureProvider,
    P: PointerDriver,
    V: VerificationObserver,
{
    solver: Solver,
    capture: C,
    pointer: P,
    observer: V,
}

impl<C, P, V> CaptchaSolverOrchestrator<C, P, V>
where
    C: CaptureProvider,
    P: PointerDriver,
    V: VerificationObserver,
{
    pub fn new(solver: Solver, capture: C, pointer: P, observer: V) -> Self {
        Self {
            solver,
            capture,
            pointer,
            observer,
        }
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Attempt up to `max_attempts` times, retrying only when the captures could not be analysed
    pub async fn run(&self, max_attempts: usize) -> Result<AttemptOutcome> {
        let mut outcome = AttemptOutcome::Retry {
            reason: "no attempt made".to_string(),
        };
        for attempt in 1..=max_attempts {
            outcome = self.attempt().await?;
            match &outcome {
                AttemptOutcome::Retry { reason } => {
                    warn!(attempt, max_attempts, reason = %reason, "attempt failed, retrying");
                }
                _ => break,
            }
        }
        Ok(outcome)
    }

    /// Capture, solve, drag and verify once.
    ///
    /// Vision and capture failures become [`AttemptOutcome::Retry`]; other errors
    /// are returned.
    pub async fn attempt(&self) -> Result<AttemptOutcome> {
        match self.attempt_inner().await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_retryable() => Ok(AttemptOutcome::Retry {
                reason: err.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    async fn attempt_inner(&self) -> Result<AttemptOutcome> {
        let images = self.stable_challenge().await?;
        let pointer = self.pointer.handle_center().await?;
        let solution = self.solver.solve(&images, pointer)?;

        let executed = self.drag(&solution).await?;

        let timing = &self.solver.config().timing;
        let rejection = match tokio::time::timeout(
            timing.verification_timeout(),
            self.observer.wait_for_success(),
        )
        .await
        {
            Ok(Ok(())) => None,
            Ok(Err(err)) => {
                warn!(error = %err, "verification observer failed");
                Some(err.to_string())
            }
            Err(_) => Some(
                AlignError::VerificationTimeout {
                    timeout_ms: timing.verification_timeout_ms,
                }
                .to_string(),
            ),
        };

        match rejection {
            None => {
                info!("captcha solved");
                Ok(AttemptOutcome::Solved { solution, executed })
            }
            Some(reason) => {
                info!(reason = %reason, "captcha not solved");
                Ok(AttemptOutcome::Rejected {
                    solution,
                    executed,
                    reason,
                })
            }
        }
    }

    async fn stable_challenge(&self) -> Result<CapturedImages> {
        let timing = &self.solver.config().timing;
        wait_until_stable(
            || self.capture.capture_challenge(),
            timing.settle_poll(),
            timing.settle_max_wait(),
        )
        .await
    }

    async fn measure_piece(&self) -> Result<Position> {
        let timing = &self.solver.config().timing;
        let bytes = wait_until_stable(
            || self.capture.capture_piece(),
            timing.settle_poll(),
            timing.settle_max_wait(),
        )
        .await?;
        self.solver.locate_piece(&decode(&bytes)?)
    }

    /// Press, run both legs, and release even when the middle fails
    async fn drag(&self, solution: &Solution) -> Result<DragPlan> {
        let start = solution.drag_plan.start;
        self.pointer.move_to(start.x, start.y, 1).await?;
        self.pointer.down().await?;

        let pressed = self.drag_pressed(solution).await;
        let released = self.pointer.up().await;
        let executed = pressed?;
        released?;
        Ok(executed)
    }

    async fn drag_pressed(&self, solution: &Solution) -> Result<DragPlan> {
        let plan = &solution.drag_plan;
        self.pointer
            .move_to(plan.coarse.x, plan.coarse.y, plan.start.steps)
            .await?;

        tokio::time::sleep(self.solver.config().timing.remeasure_delay()).await;
        let measured = self.measure_piece().await?;
        let refined = plan.refine(measured, solution.gap_position);
        info!(
            measured_x = measured.x,
            residual = refined.fine_delta().0,
            "piece measured after coarse leg"
        );

        self.pointer
            .move_to(refined.fine.x, refined.fine.y, refined.coarse.steps)
            .await?;
        Ok(refined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use async_trait::async_trait;
    use image::Rgba;
    use crate::{algorithms::encode_png, config::SolverConfig, types::Bitmap};

    const BACKGROUND: Rgba<u8> = Rgba([200, 200, 200, 255]);
    const HANDLE: Position = Position { x: 200, y: 300 };
    /// Pixels the rendered piece trails behind the pointer
    const LAG: i32 = 2;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Move(i32, i32, u32),
        Down,
        Up,
    }

    #[derive(Default)]
    struct Widget {
        events: Mutex<Vec<Event>>,
        pointer_x: Mutex<i32>,
    }

    fn piece_at(left: i32) -> Vec<u8> {
        let bitmap = Bitmap::from_fn(120, 60, |x, y| {
            let x = x as i32;
            if (left..left + 16).contains(&x) && (20..=35).contains(&y) {
                Rgba([230, 230, 230, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        encode_png(&bitmap).expect("Should encode")
    }

    struct FakeCapture {
        widget: Arc<Widget>,
        blank_piece: bool,
    }

    #[async_trait]
    impl CaptureProvider for FakeCapture {
        async fn capture_challenge(&self) -> Result<CapturedImages> {
            let challenge = Bitmap::from_fn(120, 60, |x, y| {
                if (70..=85).contains(&x) && (20..=35).contains(&y) {
                    Rgba([40, 40, 40, 255])
                } else {
                    BACKGROUND
                }
            });
            Ok(CapturedImages {
                reference: encode_png(&Bitmap::from_pixel(120, 60, BACKGROUND))?,
                challenge: encode_png(&challenge)?,
                piece: piece_at(10),
            })
        }

        async fn capture_piece(&self) -> Result<Vec<u8>> {
            if self.blank_piece {
                return encode_png(&Bitmap::new(120, 60));
            }
            let dragged = *self.widget.pointer_x.lock().unwrap() - HANDLE.x;
            Ok(piece_at(10 + dragged - LAG))
        }
    }

    struct FakePointer {
        widget: Arc<Widget>,
    }

    #[async_trait]
    impl PointerDriver for FakePointer {
        async fn handle_center(&self) -> Result<Position> {
            Ok(HANDLE)
        }

        async fn move_to(&self, x: i32, y: i32, steps: u32) -> Result<()> {
            *self.widget.pointer_x.lock().unwrap() = x;
            self.widget.events.lock().unwrap().push(Event::Move(x, y, steps));
            Ok(())
        }

        async fn down(&self) -> Result<()> {
            self.widget.events.lock().unwrap().push(Event::Down);
            Ok(())
        }

        async fn up(&self) -> Result<()> {
            self.widget.events.lock().unwrap().push(Event::Up);
            Ok(())
        }
    }

    struct FakeObserver {
        succeeds: bool,
    }

    #[async_trait]
    impl VerificationObserver for FakeObserver {
        async fn wait_for_success(&self) -> Result<()> {
            if self.succeeds {
                Ok(())
            } else {
                std::future::pending().await
            }
        }
    }

    fn fast_config() -> SolverConfig {
        let mut config = SolverConfig::default();
        config.timing.verification_timeout_ms = 50;
        config.timing.settle_poll_ms = 1;
        config.timing.settle_max_wait_ms = 20;
        config.timing.remeasure_delay_ms = 1;
        config
    }

    fn orchestrator(
        succeeds: bool,
        blank_piece: bool,
    ) -> (Arc<Widget>, CaptchaSolverOrchestrator<FakeCapture, FakePointer, FakeObserver>) {
        let widget = Arc::new(Widget::default());
        let orchestrator = CaptchaSolverOrchestrator::new(
            Solver::new(fast_config()).expect("Should build solver"),
            FakeCapture { widget: widget.clone(), blank_piece },
            FakePointer { widget: widget.clone() },
            FakeObserver { succeeds },
        );
        (widget, orchestrator)
    }

    #[tokio::test]
    async fn test_coarse_remeasure_fine_sequence() {
        let (widget, orchestrator) = orchestrator(true, false);
        let outcome = orchestrator.attempt().await.expect("Should run");
        assert!(outcome.is_success());

        // gap at x=77, piece at x=17: coarse covers 54 of 60 px, the piece then
        // renders at 69 because of the lag, so the fine leg adds 8
        let events = widget.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                Event::Move(200, 300, 1),
                Event::Down,
                Event::Move(254, 300, 25),
                Event::Move(262, 300, 5),
                Event::Up,
            ]
        );

        let AttemptOutcome::Solved { solution, executed } = outcome else {
            panic!("expected a solved outcome");
        };
        assert_eq!(solution.gap_position, Position::new(77, 27));
        assert_eq!(executed.fine_delta(), (8, 0));
    }

    #[tokio::test]
    async fn test_verification_timeout_reports_failure() {
        let (widget, orchestrator) = orchestrator(false, false);
        let outcome = orchestrator.attempt().await.expect("Timeout should not be an error");

        assert!(!outcome.is_success());
        let AttemptOutcome::Rejected { reason, .. } = outcome else {
            panic!("expected a rejected outcome");
        };
        assert_eq!(reason, "Success indicator did not appear within 50 ms");
        assert_eq!(widget.events.lock().unwrap().last(), Some(&Event::Up));
    }

    #[tokio::test]
    async fn test_lost_piece_releases_pointer_and_asks_for_retry() {
        let (widget, orchestrator) = orchestrator(true, true);
        let outcome = orchestrator.attempt().await.expect("Vision failure should not be an error");

        assert!(matches!(outcome, AttemptOutcome::Retry { .. }));
        let events = widget.events.lock().unwrap().clone();
        assert_eq!(events.last(), Some(&Event::Up));
        assert_eq!(events.iter().filter(|e| **e == Event::Down).count(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_after_max_attempts() {
        let (widget, orchestrator) = orchestrator(true, true);
        let outcome = orchestrator.run(3).await.expect("Should run");

        assert!(matches!(outcome, AttemptOutcome::Retry { .. }));
        let downs = widget
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == Event::Down)
            .count();
        assert_eq!(downs, 3);
    }
}
