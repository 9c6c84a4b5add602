use crate::bodies::{BodySystem, solar_system};
use crate::camera::Camera;
use crate::flight::{CameraFlight, system_overview};
use crate::globe::{Globe, Marker};

/// Which scene the viewer currently presents.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewMode {
    SolarSystem,
    Globe,
    Mars,
}

/// The owned viewer resource: camera, globe, bodies, and teardown registry.
///
/// Exactly one component owns a `SceneViewer` at a time. Switching modes
/// never mutates a live viewer in place: `recreate` tears the old one down
/// first, then constructs the next with a bumped generation. In-flight async
/// work compares generations before touching the scene.
pub struct SceneViewer {
    mode: ViewMode,
    pub camera: Camera,
    pub globe: Globe,
    pub bodies: Option<BodySystem>,
    generation: u64,
    destroyed: bool,
    move_epoch: u64,
    teardowns: Vec<Box<dyn FnOnce()>>,
}

impl SceneViewer {
    pub fn new(mode: ViewMode) -> Self {
        Self::with_generation(mode, 1)
    }

    fn with_generation(mode: ViewMode, generation: u64) -> Self {
        let mut viewer = Self {
            mode,
            camera: Camera::home(),
            globe: Globe::new(),
            bodies: None,
            generation,
            destroyed: false,
            move_epoch: 0,
            teardowns: Vec::new(),
        };
        match mode {
            ViewMode::Globe => {
                viewer.globe.markers = nasa_centers();
            }
            ViewMode::Mars => {
                // Mars surface tint, matching CSS #CD5C5C.
                viewer.globe.base_color = [0.804, 0.361, 0.361, 1.0];
                viewer.globe.enable_lighting = true;
                viewer.globe.markers = mars_features();
            }
            ViewMode::SolarSystem => {
                viewer.globe.show = false;
                let system = solar_system();
                let saturn = system
                    .bodies()
                    .iter()
                    .find(|b| b.name == "Saturn")
                    .map(|b| b.center)
                    .unwrap_or_default();
                system_overview(saturn).apply_to(&mut viewer.camera);
                viewer.bodies = Some(system);
            }
        }
        viewer
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Epoch bumped on every camera-move-end; viewport tracking keys off it.
    pub fn move_epoch(&self) -> u64 {
        self.move_epoch
    }

    pub fn notify_move_end(&mut self) {
        self.move_epoch += 1;
    }

    /// Register cleanup to run at teardown. Callbacks run in reverse
    /// registration order so dependents release before their dependencies.
    pub fn register_teardown(&mut self, cleanup: Box<dyn FnOnce()>) {
        self.teardowns.push(cleanup);
    }

    /// Destroy the viewer. Idempotent; later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.generation += 1;
        for cleanup in self.teardowns.drain(..).rev() {
            cleanup();
        }
        self.bodies = None;
        self.globe.markers.clear();
    }

    /// Tear this viewer down and construct its replacement.
    pub fn recreate(mut self, mode: ViewMode) -> SceneViewer {
        self.teardown();
        Self::with_generation(mode, self.generation + 1)
    }

    /// Jump a flight to its end state. A new flight supersedes any prior
    /// one; arrival counts as a camera-move-end.
    pub fn fly(&mut self, flight: &CameraFlight) {
        flight.apply_to(&mut self.camera);
        self.notify_move_end();
    }

    /// Restore the initial whole-Earth view.
    pub fn home(&mut self) {
        self.camera = Camera::home();
        self.notify_move_end();
    }
}

fn nasa_centers() -> Vec<Marker> {
    vec![
        Marker::new("NASA Goddard Space Flight Center", 38.9964, -76.8479),
        Marker::new("NASA Kennedy Space Center", 28.5721, -80.6480),
        Marker::new("NASA Johnson Space Center", 29.5591, -95.0907),
        Marker::new("NASA Jet Propulsion Laboratory", 34.2048, -118.1711),
    ]
}

fn mars_features() -> Vec<Marker> {
    vec![
        Marker::new("Olympus Mons", 18.65, -133.8),
        Marker::new("Valles Marineris", -14.0, -59.0),
        Marker::new("Polar Ice Cap", 85.0, 0.0),
        Marker::new("Hellas Basin", -42.4, 70.5),
        Marker::new("Gale Crater", -5.4, 137.8),
    ]
}

#[cfg(test)]
mod tests {
    use super::{SceneViewer, ViewMode};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn globe_mode_carries_sample_markers() {
        let viewer = SceneViewer::new(ViewMode::Globe);
        assert_eq!(viewer.globe.markers.len(), 4);
        assert!(viewer.globe.show);
        assert!(viewer.bodies.is_none());
    }

    #[test]
    fn solar_system_mode_hides_the_globe() {
        let viewer = SceneViewer::new(ViewMode::SolarSystem);
        assert!(!viewer.globe.show);
        assert_eq!(viewer.bodies.as_ref().map(|b| b.len()), Some(10));
    }

    #[test]
    fn mars_mode_tints_the_base() {
        let viewer = SceneViewer::new(ViewMode::Mars);
        assert!(viewer.globe.base_color[0] > viewer.globe.base_color[2]);
        assert_eq!(viewer.globe.markers.len(), 5);
    }

    #[test]
    fn teardown_runs_cleanups_in_reverse_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut viewer = SceneViewer::new(ViewMode::Globe);
        for tag in ["base", "overlay"] {
            let order = Rc::clone(&order);
            viewer.register_teardown(Box::new(move || order.borrow_mut().push(tag)));
        }
        viewer.teardown();
        assert_eq!(*order.borrow(), vec!["overlay", "base"]);
        assert!(viewer.is_destroyed());

        // Idempotent.
        viewer.teardown();
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn recreate_destroys_before_constructing() {
        let viewer = SceneViewer::new(ViewMode::SolarSystem);
        let old_generation = viewer.generation();
        let next = viewer.recreate(ViewMode::Globe);
        assert_eq!(next.mode(), ViewMode::Globe);
        assert!(next.generation() > old_generation);
        assert!(!next.is_destroyed());
    }

    #[test]
    fn flights_count_as_camera_moves() {
        let mut viewer = SceneViewer::new(ViewMode::Globe);
        let before = viewer.move_epoch();
        let flight = crate::flight::fly_to_point(10.0, 20.0, 1_000_000.0, 3.0);
        viewer.fly(&flight);
        assert!(viewer.move_epoch() > before);
        assert_eq!(viewer.camera.position, flight.destination);
    }
}
