use foundation::math::{Geodetic, Vec3, geodetic_to_ecef};

/// Default viewport size in pixels.
pub const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 720.0);

/// Default vertical field of view (radians).
pub const DEFAULT_FOV_Y_RAD: f64 = std::f64::consts::FRAC_PI_3;

/// The initial "home" altitude: whole Earth in frame.
pub const HOME_ALTITUDE_M: f64 = 20_000_000.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

/// Perspective camera in earth-centered cartesian space.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Unit look direction.
    pub direction: Vec3,
    /// Approximate up; re-orthogonalized when building pick rays.
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl Camera {
    pub fn new(position: Vec3, direction: Vec3, up: Vec3) -> Self {
        Self {
            position,
            direction,
            up,
            fov_y_rad: DEFAULT_FOV_Y_RAD,
            width_px: DEFAULT_VIEWPORT.0,
            height_px: DEFAULT_VIEWPORT.1,
        }
    }

    /// Straight-down view over a geodetic point, up pointing north.
    pub fn look_down_at(geo: Geodetic) -> Self {
        let position = geodetic_to_ecef(geo);
        let down = position
            .scale(-1.0)
            .normalized()
            .unwrap_or(Vec3::new(-1.0, 0.0, 0.0));
        let east = Vec3::UNIT_Z
            .cross(position)
            .normalized()
            .unwrap_or(Vec3::new(0.0, 1.0, 0.0));
        let north = position.cross(east).normalized().unwrap_or(Vec3::UNIT_Z);
        Self::new(position, down, north)
    }

    /// The initial whole-Earth view above (0, 0).
    pub fn home() -> Self {
        Self::look_down_at(Geodetic::new(0.0, 0.0, HOME_ALTITUDE_M))
    }

    pub fn set_view(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        self.position = position;
        self.direction = direction;
        self.up = up;
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.width_px = width_px.max(1.0);
        self.height_px = height_px.max(1.0);
    }

    /// Cast a ray through a viewport pixel. `None` when the camera frame is
    /// degenerate (zero direction or up parallel to direction).
    pub fn pick_ray(&self, x_px: f64, y_px: f64) -> Option<Ray> {
        let forward = self.direction.normalized()?;
        let right = forward.cross(self.up).normalized()?;
        let true_up = right.cross(forward);

        let tan_half = (self.fov_y_rad / 2.0).tan();
        let aspect = self.width_px / self.height_px;
        let ndc_x = 2.0 * x_px / self.width_px - 1.0;
        let ndc_y = 1.0 - 2.0 * y_px / self.height_px;

        let dir = (forward
            + right.scale(ndc_x * tan_half * aspect)
            + true_up.scale(ndc_y * tan_half))
        .normalized()?;
        Some(Ray::new(self.position, dir))
    }

    /// Rays through the four viewport corners:
    /// top-left, top-right, bottom-left, bottom-right.
    pub fn corner_rays(&self) -> [Option<Ray>; 4] {
        let (w, h) = (self.width_px, self.height_px);
        [
            self.pick_ray(0.0, 0.0),
            self.pick_ray(w, 0.0),
            self.pick_ray(0.0, h),
            self.pick_ray(w, h),
        ]
    }
}
