use foundation::math::{Geodetic, Vec3, WGS84_A, WGS84_B, ecef_to_geodetic};

use crate::camera::Ray;

/// A named point of interest drawn on the globe surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub position: Geodetic,
}

impl Marker {
    pub fn new(name: impl Into<String>, lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            name: name.into(),
            position: Geodetic::new(lat_deg, lon_deg, 0.0),
        }
    }
}

/// The WGS84 globe surface and its presentation state.
///
/// Tile loading itself happens elsewhere; the globe only tracks the
/// "all base tiles loaded" flag that readiness gating reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Globe {
    pub show: bool,
    pub base_color: [f32; 4],
    pub enable_lighting: bool,
    tiles_loaded: bool,
    pub markers: Vec<Marker>,
}

impl Default for Globe {
    fn default() -> Self {
        Self {
            show: true,
            base_color: [0.04, 0.16, 0.32, 1.0],
            enable_lighting: false,
            tiles_loaded: false,
            markers: Vec::new(),
        }
    }
}

impl Globe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tiles_loaded(&mut self, loaded: bool) {
        self.tiles_loaded = loaded;
    }

    pub fn tiles_loaded(&self) -> bool {
        self.tiles_loaded
    }

    /// Intersect a ray with the WGS84 ellipsoid; returns the nearest surface
    /// point in ECEF, or `None` when the ray misses or starts past the globe.
    pub fn intersect_ray(&self, ray: Ray) -> Option<Vec3> {
        if !self.show {
            return None;
        }

        // Scale to the unit sphere, solve the quadratic there.
        let o = Vec3::new(
            ray.origin.x / WGS84_A,
            ray.origin.y / WGS84_A,
            ray.origin.z / WGS84_B,
        );
        let d = Vec3::new(ray.dir.x / WGS84_A, ray.dir.y / WGS84_A, ray.dir.z / WGS84_B);

        let a = d.dot(d);
        if a <= 0.0 {
            return None;
        }
        let b = 2.0 * o.dot(d);
        let c = o.dot(o) - 1.0;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        let t_near = (-b - sqrt_disc) / (2.0 * a);
        let t_far = (-b + sqrt_disc) / (2.0 * a);
        let t = if t_near >= 0.0 {
            t_near
        } else if t_far >= 0.0 {
            // Origin inside the ellipsoid; exit point.
            t_far
        } else {
            return None;
        };

        Some(ray.point_at(t))
    }

    /// Like `intersect_ray` but in geodetic coordinates.
    pub fn pick_geodetic(&self, ray: Ray) -> Option<Geodetic> {
        self.intersect_ray(ray).map(ecef_to_geodetic)
    }
}
