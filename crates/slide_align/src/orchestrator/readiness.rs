use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{trace, warn};
use crate::error::Result;

/// Capture repeatedly until two consecutive results are identical.
///
/// Gives up after `max_wait` and returns the latest capture, which may still be
/// mid-render.
pub async fn wait_until_stable<T, F, Fut>(
    mut capture: F,
    poll: Duration,
    max_wait: Duration,
) -> Result<T>
where
    T: PartialEq,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let mut previous = capture().await?;
    let mut polls = 1;

    loop {
        tokio::time::sleep(poll).await;
        let current = capture().await?;
        polls += 1;

        if current == previous {
            trace!(polls, "capture settled");
            return Ok(current);
        }
        if started.elapsed() >= max_wait {
            warn!(polls, max_wait_ms = max_wait.as_millis() as u64, "capture still changing, using latest");
            return Ok(current);
        }
        previous = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::error::AlignError;

    #[tokio::test]
    async fn test_returns_once_stable() {
        let calls = AtomicUsize::new(0);
        let frames = [1, 2, 3, 3, 9];

        let value = wait_until_stable(
            || {
                let frame = frames[calls.fetch_add(1, Ordering::SeqCst)];
                async move { Ok(frame) }
            },
            Duration::from_millis(1),
            Duration::from_secs(5),
        )
        .await
        .expect("Should settle");

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_wait() {
        let calls = AtomicUsize::new(0);

        let value = wait_until_stable(
            || {
                let i = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(i) }
            },
            Duration::from_millis(5),
            Duration::from_millis(20),
        )
        .await
        .expect("Should return latest capture");

        assert_eq!(value + 1, calls.load(Ordering::SeqCst));
        assert!(value >= 2);
    }

    #[tokio::test]
    async fn test_capture_error_propagates() {
        let result: Result<u8> = wait_until_stable(
            || async { Err(AlignError::Capture("canvas missing".to_string())) },
            Duration::from_millis(1),
            Duration::from_millis(10),
        )
        .await;
        assert!(matches!(result, Err(AlignError::Capture(_))));
    }
}
