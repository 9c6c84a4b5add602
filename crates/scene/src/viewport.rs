use foundation::math::Geodetic;
use foundation::time::Time;

use crate::camera::Camera;
use crate::globe::Globe;
use crate::viewer::SceneViewer;

/// Delay after viewer construction before the first sample (seconds).
pub const POST_INIT_SETTLE_S: f64 = 0.5;

/// The geographic footprint of the viewport: all four corners projected
/// onto the globe surface. Either every corner is present or the sample
/// pass did not publish.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportBounds {
    pub top_left: Geodetic,
    pub top_right: Geodetic,
    pub bottom_left: Geodetic,
    pub bottom_right: Geodetic,
}

/// One sampling pass: corner rays against the globe. `None` unless all four
/// corners hit (a tilted camera can point corners at open sky).
pub fn sample_viewport(camera: &Camera, globe: &Globe) -> Option<ViewportBounds> {
    let [tl, tr, bl, br] = camera.corner_rays();
    Some(ViewportBounds {
        top_left: globe.pick_geodetic(tl?)?,
        top_right: globe.pick_geodetic(tr?)?,
        bottom_left: globe.pick_geodetic(bl?)?,
        bottom_right: globe.pick_geodetic(br?)?,
    })
}

/// Retains the last successful sample across camera moves.
///
/// A failed pass never clears previously published bounds; stale-but-valid
/// beats null. `bounds()` is `None` only before the first success.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTracker {
    last: Option<ViewportBounds>,
    seen_epoch: u64,
    created_at: Time,
    initial_sample_done: bool,
}

impl ViewportTracker {
    pub fn new(now: Time) -> Self {
        Self {
            last: None,
            seen_epoch: 0,
            created_at: now,
            initial_sample_done: false,
        }
    }

    pub fn bounds(&self) -> Option<&ViewportBounds> {
        self.last.as_ref()
    }

    /// Sample when the camera has settled after init or moved since the
    /// last pass. Returns whether new bounds were published.
    pub fn update(&mut self, viewer: &SceneViewer, now: Time) -> bool {
        let init_due = !self.initial_sample_done
            && now.seconds_since(self.created_at) >= POST_INIT_SETTLE_S;
        let moved = viewer.move_epoch() != self.seen_epoch;
        if !init_due && !moved {
            return false;
        }

        self.seen_epoch = viewer.move_epoch();
        if init_due {
            self.initial_sample_done = true;
        }

        match sample_viewport(&viewer.camera, &viewer.globe) {
            Some(bounds) => {
                self.last = Some(bounds);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{POST_INIT_SETTLE_S, ViewportTracker, sample_viewport};
    use crate::camera::Camera;
    use crate::globe::Globe;
    use crate::viewer::{SceneViewer, ViewMode};
    use foundation::math::{Geodetic, Vec3};
    use foundation::time::Time;

    fn low_camera() -> Camera {
        // Low enough that every corner ray still hits the ellipsoid.
        Camera::look_down_at(Geodetic::new(10.0, 20.0, 800_000.0))
    }

    #[test]
    fn low_view_samples_all_four_corners() {
        let bounds = sample_viewport(&low_camera(), &Globe::new()).expect("bounds");
        // Corners straddle the sub-camera point.
        assert!(bounds.top_left.lon_deg < bounds.top_right.lon_deg);
        assert!(bounds.bottom_left.lat_deg < bounds.top_left.lat_deg);
    }

    #[test]
    fn sky_pointing_camera_samples_nothing() {
        let mut camera = low_camera();
        camera.direction = camera.position.normalized().unwrap();
        assert_eq!(sample_viewport(&camera, &Globe::new()), None);
    }

    #[test]
    fn tracker_keeps_stale_bounds_on_miss() {
        let mut viewer = SceneViewer::new(ViewMode::Globe);
        viewer.camera = low_camera();
        viewer.notify_move_end();

        let mut tracker = ViewportTracker::new(Time(0.0));
        assert!(tracker.update(&viewer, Time(0.1)));
        let published = *tracker.bounds().expect("bounds");

        // Tilt toward space and move again: the pass misses, bounds hold.
        viewer.camera.direction = viewer.camera.position.normalized().unwrap();
        viewer.notify_move_end();
        assert!(!tracker.update(&viewer, Time(0.2)));
        assert_eq!(tracker.bounds(), Some(&published));
    }

    #[test]
    fn no_bounds_before_first_successful_sample() {
        let viewer = SceneViewer::new(ViewMode::Globe);
        let tracker = ViewportTracker::new(Time(0.0));
        assert_eq!(tracker.bounds(), None);
    }

    #[test]
    fn initial_sample_waits_for_the_settle_delay() {
        let mut viewer = SceneViewer::new(ViewMode::Globe);
        viewer.camera = low_camera();

        let mut tracker = ViewportTracker::new(Time(0.0));
        // No move event yet and the settle window has not elapsed.
        assert!(!tracker.update(&viewer, Time(POST_INIT_SETTLE_S / 2.0)));
        assert!(tracker.update(&viewer, Time(POST_INIT_SETTLE_S + 0.1)));
        assert!(tracker.bounds().is_some());
    }

    #[test]
    fn hidden_globe_never_samples() {
        let mut viewer = SceneViewer::new(ViewMode::SolarSystem);
        viewer.camera = Camera::new(
            Vec3::new(3.0e7, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::UNIT_Z,
        );
        viewer.notify_move_end();
        let mut tracker = ViewportTracker::new(Time(0.0));
        assert!(!tracker.update(&viewer, Time(1.0)));
        assert_eq!(tracker.bounds(), None);
    }
}
