use std::time::Duration;

use foundation::time::{IsoDate, TimeSelector};
use layers::OverlaySpec;
use tracing::warn;

use crate::frame::{CapturedImage, FrameError, SceneFrame, flow_aborted};
use crate::readiness::imagery_ready;

/// Render passes forced before a dated capture, with settles in between.
/// Several explicit passes defeat frame coalescing in the renderer.
pub const RENDER_PASSES: usize = 5;
pub const RENDER_SETTLE: Duration = Duration::from_millis(100);

/// The lighter sequence for capturing the view as-is.
pub const QUICK_RENDER_PASSES: usize = 3;
pub const QUICK_RENDER_SETTLE: Duration = Duration::from_millis(50);

/// Readiness wait when the overlay was just re-dated.
pub const READY_WAIT: Duration = Duration::from_secs(15);

/// Readiness wait when capturing the current view.
pub const QUICK_READY_WAIT: Duration = Duration::from_secs(5);

/// Delay before restoring the pre-capture overlay, so the modal over the
/// result is not undercut by the map visibly swapping back.
pub const RESTORE_DELAY: Duration = Duration::from_millis(100);

pub(crate) async fn force_renders<S: SceneFrame>(
    scene: &mut S,
    passes: usize,
    settle: Duration,
) -> Result<(), FrameError> {
    for _ in 0..passes {
        scene.render().await?;
        tokio::time::sleep(settle).await;
    }
    // One more pass after the last settle.
    scene.render().await
}

/// Capture the current view. Failures are caught and logged; the caller
/// gets `None` and the scene is left untouched.
pub async fn take_screenshot<S: SceneFrame>(scene: &mut S) -> Option<CapturedImage> {
    let generation = scene.generation();
    if flow_aborted(scene, generation) {
        return None;
    }

    imagery_ready(scene, QUICK_READY_WAIT).await;
    if flow_aborted(scene, generation) {
        return None;
    }

    let result = async {
        force_renders(scene, QUICK_RENDER_PASSES, QUICK_RENDER_SETTLE).await?;
        scene.capture_frame()
    }
    .await;

    match result {
        Ok(image) => Some(image),
        Err(err) => {
            warn!("screenshot failed: {err}");
            None
        }
    }
}

/// Capture the attached overlay re-dated to `date`, then restore the
/// original overlay after a short delay. Requires an attached overlay.
pub async fn take_dated_screenshot<S: SceneFrame>(
    scene: &mut S,
    date: IsoDate,
) -> Option<CapturedImage> {
    let Some(original) = scene.attached_overlay() else {
        warn!("dated screenshot requested with no overlay attached");
        return None;
    };
    let generation = scene.generation();
    if flow_aborted(scene, generation) {
        return None;
    }

    let dated = OverlaySpec {
        time: TimeSelector::Date(date),
        ..original.clone()
    };
    scene.apply_overlay(&dated);
    imagery_ready(scene, READY_WAIT).await;

    let result = async {
        if flow_aborted(scene, generation) {
            return Err(FrameError::Render("viewer torn down mid-capture".into()));
        }
        force_renders(scene, RENDER_PASSES, RENDER_SETTLE).await?;
        scene.capture_frame()
    }
    .await;

    let image = match result {
        Ok(image) => Some(image),
        Err(err) => {
            warn!("dated screenshot failed: {err}");
            None
        }
    };

    restore_overlay(scene, &original, generation).await;
    image
}

/// Best-effort restore of the pre-flow overlay, skipped if the viewer died.
pub(crate) async fn restore_overlay<S: SceneFrame>(
    scene: &mut S,
    original: &OverlaySpec,
    generation: u64,
) {
    tokio::time::sleep(RESTORE_DELAY).await;
    if !flow_aborted(scene, generation) {
        scene.apply_overlay(original);
    }
}

#[cfg(test)]
mod tests {
    use foundation::time::{IsoDate, TimeSelector};
    use layers::{ImageFormat, OverlaySpec};

    use super::{take_dated_screenshot, take_screenshot};
    use crate::fakes::FakeScene;

    fn overlay(date: &str) -> OverlaySpec {
        OverlaySpec::new(
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            TimeSelector::Date(IsoDate::parse(date).unwrap()),
            ImageFormat::Jpeg,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn quick_screenshot_produces_an_image() {
        let mut scene = FakeScene::new();
        let image = take_screenshot(&mut scene).await.expect("image");
        assert!(!image.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn render_failure_is_a_silent_no_op() {
        let mut scene = FakeScene::new();
        scene.fail_render = true;
        assert!(take_screenshot(&mut scene).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn destroyed_viewer_is_never_touched() {
        let mut scene = FakeScene::new();
        scene.destroyed = true;
        assert!(take_screenshot(&mut scene).await.is_none());
        assert!(scene.applied.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dated_screenshot_swaps_and_restores_the_overlay() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        let image = take_dated_screenshot(&mut scene, IsoDate::parse("2023-06-01").unwrap())
            .await
            .expect("image");
        assert!(!image.is_empty());

        // First the re-dated overlay, then the restore.
        assert_eq!(scene.applied.len(), 2);
        assert_eq!(scene.applied[0].time.wmts_token(), "2023-06-01");
        assert_eq!(scene.applied[1], overlay("2024-03-05"));
        assert_eq!(scene.attached, Some(overlay("2024-03-05")));
    }

    #[tokio::test(start_paused = true)]
    async fn dated_screenshot_without_overlay_is_a_no_op() {
        let mut scene = FakeScene::new();
        let image =
            take_dated_screenshot(&mut scene, IsoDate::parse("2023-06-01").unwrap()).await;
        assert!(image.is_none());
        assert!(scene.applied.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn capture_failure_still_restores() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        scene.fail_capture_at = Some(1);
        let image =
            take_dated_screenshot(&mut scene, IsoDate::parse("2023-06-01").unwrap()).await;
        assert!(image.is_none());
        assert_eq!(scene.attached, Some(overlay("2024-03-05")));
    }
}
