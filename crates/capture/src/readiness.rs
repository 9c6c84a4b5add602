use std::time::Duration;

use crate::frame::SceneFrame;

/// Fixed poll interval for readiness checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Wait until every imagery layer reports ready and the globe's base tiles
/// are loaded, or until `max_wait` elapses.
///
/// Always resolves; a timeout is "best effort, proceed anyway", never an
/// error. Returns whether the scene actually became ready. Worst-case
/// latency is `max_wait` plus one poll interval.
pub async fn imagery_ready<S: SceneFrame>(scene: &S, max_wait: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + max_wait;
    loop {
        if scene.imagery_ready() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            tracing::debug!(?max_wait, "imagery readiness timed out; proceeding anyway");
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
