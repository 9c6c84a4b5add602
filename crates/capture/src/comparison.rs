use foundation::time::{IsoDate, TimeSelector};
use layers::OverlaySpec;
use tracing::warn;

use crate::frame::{CapturedImage, SceneFrame, flow_aborted};
use crate::readiness::imagery_ready;
use crate::screenshot::{READY_WAIT, RENDER_PASSES, RENDER_SETTLE, force_renders, restore_overlay};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ComparisonPhase {
    #[default]
    Idle,
    CapturingBefore,
    CapturingAfter,
    Ready,
    Error,
}

/// Both captures and both dates, bundled atomically: a session exists only
/// once the whole comparison succeeded. The UI never sees half of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSession {
    pub before_image: CapturedImage,
    pub after_image: CapturedImage,
    pub before_date: IsoDate,
    pub after_date: IsoDate,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("no overlay attached to compare against")]
    NoOverlay,
    #[error("viewer was torn down mid-comparison")]
    ViewerGone,
    #[error("capture produced no image")]
    CaptureFailed,
}

/// Sequential before/after capture over the single shared overlay.
///
/// The before capture strictly precedes the after capture: both reuse the
/// one attached overlay, so there is exactly one writer at a time, enforced
/// by program order. Whatever happens, the overlay that was active when the
/// comparison started is restored afterwards.
#[derive(Debug, Default)]
pub struct ComparisonCapture {
    phase: ComparisonPhase,
    session: Option<ComparisonSession>,
}

impl ComparisonCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ComparisonPhase {
        self.phase
    }

    /// At most one session exists; `None` while idle, errored, or cleared.
    pub fn session(&self) -> Option<&ComparisonSession> {
        self.session.as_ref()
    }

    pub fn clear(&mut self) {
        self.session = None;
        self.phase = ComparisonPhase::Idle;
    }

    /// Run the full comparison. Starting a new one discards any prior
    /// session before the first capture begins.
    pub async fn take_comparison<S: SceneFrame>(
        &mut self,
        scene: &mut S,
        before: IsoDate,
        after: IsoDate,
    ) -> Result<&ComparisonSession, ComparisonError> {
        self.clear();

        let original = scene.attached_overlay().ok_or(ComparisonError::NoOverlay)?;
        let generation = scene.generation();

        self.phase = ComparisonPhase::CapturingBefore;
        let before_image = match capture_dated(scene, &original, generation, &before).await {
            Ok(image) => image,
            Err(err) => return self.fail(scene, &original, generation, err).await,
        };

        self.phase = ComparisonPhase::CapturingAfter;
        let after_image = match capture_dated(scene, &original, generation, &after).await {
            Ok(image) => image,
            Err(err) => return self.fail(scene, &original, generation, err).await,
        };

        let session = self.session.insert(ComparisonSession {
            before_image,
            after_image,
            before_date: before,
            after_date: after,
        });
        self.phase = ComparisonPhase::Ready;

        restore_overlay(scene, &original, generation).await;
        Ok(session)
    }

    async fn fail<S: SceneFrame>(
        &mut self,
        scene: &mut S,
        original: &OverlaySpec,
        generation: u64,
        err: ComparisonError,
    ) -> Result<&ComparisonSession, ComparisonError> {
        warn!("comparison aborted: {err}");
        self.phase = ComparisonPhase::Error;
        self.session = None;
        restore_overlay(scene, original, generation).await;
        Err(err)
    }
}

async fn capture_dated<S: SceneFrame>(
    scene: &mut S,
    original: &OverlaySpec,
    generation: u64,
    date: &IsoDate,
) -> Result<CapturedImage, ComparisonError> {
    if flow_aborted(scene, generation) {
        return Err(ComparisonError::ViewerGone);
    }

    let dated = OverlaySpec {
        time: TimeSelector::Date(date.clone()),
        ..original.clone()
    };
    scene.apply_overlay(&dated);
    imagery_ready(scene, READY_WAIT).await;

    if flow_aborted(scene, generation) {
        return Err(ComparisonError::ViewerGone);
    }
    force_renders(scene, RENDER_PASSES, RENDER_SETTLE)
        .await
        .map_err(|err| {
            warn!("comparison render failed: {err}");
            ComparisonError::CaptureFailed
        })?;
    scene.capture_frame().map_err(|err| {
        warn!("comparison capture failed: {err}");
        ComparisonError::CaptureFailed
    })
}

#[cfg(test)]
mod tests {
    use foundation::time::{IsoDate, TimeSelector};
    use layers::{ImageFormat, OverlaySpec};
    use pretty_assertions::assert_eq;

    use super::{ComparisonCapture, ComparisonError, ComparisonPhase};
    use crate::fakes::FakeScene;

    fn overlay(date: &str) -> OverlaySpec {
        OverlaySpec::new(
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            TimeSelector::Date(IsoDate::parse(date).unwrap()),
            ImageFormat::Jpeg,
        )
    }

    fn date(s: &str) -> IsoDate {
        IsoDate::parse(s).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_comparison_bundles_both_dates() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        let mut comparison = ComparisonCapture::new();

        let session = comparison
            .take_comparison(&mut scene, date("2024-01-01"), date("2024-02-01"))
            .await
            .expect("session");

        assert_eq!(session.before_date.as_str(), "2024-01-01");
        assert_eq!(session.after_date.as_str(), "2024-02-01");
        assert!(!session.before_image.is_empty());
        assert!(!session.after_image.is_empty());
        // Different dates rendered different frames.
        assert_ne!(session.before_image, session.after_image);
        assert_eq!(comparison.phase(), ComparisonPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn original_overlay_is_restored_after_success() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        let mut comparison = ComparisonCapture::new();
        comparison
            .take_comparison(&mut scene, date("2024-01-01"), date("2024-02-01"))
            .await
            .unwrap();

        assert_eq!(scene.attached, Some(overlay("2024-03-05")));
        // before, after, restore.
        assert_eq!(scene.applied.len(), 3);
        assert_eq!(scene.applied[2], overlay("2024-03-05"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_second_capture_leaves_no_partial_session() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        scene.fail_capture_at = Some(2);
        let mut comparison = ComparisonCapture::new();

        let err = comparison
            .take_comparison(&mut scene, date("2024-01-01"), date("2024-02-01"))
            .await
            .unwrap_err();
        assert_eq!(err, ComparisonError::CaptureFailed);
        assert_eq!(comparison.session(), None);
        assert_eq!(comparison.phase(), ComparisonPhase::Error);
        // Restore still happened.
        assert_eq!(scene.attached, Some(overlay("2024-03-05")));
    }

    #[tokio::test(start_paused = true)]
    async fn no_overlay_means_no_comparison() {
        let mut scene = FakeScene::new();
        let mut comparison = ComparisonCapture::new();
        let err = comparison
            .take_comparison(&mut scene, date("2024-01-01"), date("2024-02-01"))
            .await
            .unwrap_err();
        assert_eq!(err, ComparisonError::NoOverlay);
        assert!(scene.applied.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_comparison_discards_the_previous_session() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        let mut comparison = ComparisonCapture::new();
        comparison
            .take_comparison(&mut scene, date("2024-01-01"), date("2024-02-01"))
            .await
            .unwrap();

        // Second run fails at the first capture: the old session must not
        // survive as a stale half-truth.
        scene.fail_capture_at = Some(4);
        let _ = comparison
            .take_comparison(&mut scene, date("2024-05-01"), date("2024-06-01"))
            .await;
        assert_eq!(comparison.session(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn torn_down_viewer_aborts_without_mutation() {
        let mut scene = FakeScene::with_overlay(overlay("2024-03-05"));
        scene.destroyed = true;
        let mut comparison = ComparisonCapture::new();
        let err = comparison
            .take_comparison(&mut scene, date("2024-01-01"), date("2024-02-01"))
            .await
            .unwrap_err();
        assert_eq!(err, ComparisonError::ViewerGone);
        assert!(scene.applied.is_empty());
    }
}
