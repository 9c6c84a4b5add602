use foundation::GeoRect;
use foundation::math::{Geodetic, Vec3, WGS84_A};

use crate::camera::{Camera, DEFAULT_FOV_Y_RAD};

/// Minimum angular span for bounding-box flight targets (degrees per axis).
///
/// Point-sized search results would otherwise zoom the camera absurdly far
/// in; degenerate boxes are grown to this span around their own center.
pub const MIN_RECT_SPAN_DEG: f64 = 0.1;

/// Default altitude for point flights (meters).
pub const DEFAULT_POINT_ALTITUDE_M: f64 = 2_000_000.0;

/// Default duration for point flights (seconds).
pub const DEFAULT_POINT_DURATION_S: f64 = 3.0;

/// Camera standoff for body focus, as a multiple of the body radius.
pub const FOCUS_DISTANCE_FACTOR: f64 = 8.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicInOut,
}

impl Easing {
    pub fn eval(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// A time-bounded animated camera transition.
///
/// Flights are not cancellable mid-way; starting a new flight supersedes
/// the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFlight {
    pub destination: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub duration_s: f64,
    pub easing: Easing,
}

impl CameraFlight {
    /// Eased position along the flight path, `t` in seconds from start.
    pub fn position_at(&self, from: Vec3, t: f64) -> Vec3 {
        if self.duration_s <= 0.0 {
            return self.destination;
        }
        let s = self.easing.eval(t / self.duration_s);
        from.lerp(self.destination, s)
    }

    /// Jump the camera to the flight's end state.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.set_view(self.destination, self.direction, self.up);
    }
}

fn look_down_flight(geo: Geodetic, duration_s: f64) -> CameraFlight {
    let staged = Camera::look_down_at(geo);
    CameraFlight {
        destination: staged.position,
        direction: staged.direction,
        up: staged.up,
        duration_s,
        easing: Easing::Linear,
    }
}

/// Fly to a point at a fixed altitude, looking straight down.
pub fn fly_to_point(lat_deg: f64, lon_deg: f64, altitude_m: f64, duration_s: f64) -> CameraFlight {
    look_down_flight(Geodetic::new(lat_deg, lon_deg, altitude_m), duration_s)
}

/// Fly to a search result's bounding box.
///
/// The rect is first grown to `MIN_RECT_SPAN_DEG`; the altitude is chosen so
/// the larger span fits the vertical field of view.
pub fn fly_to_rect(rect: GeoRect, duration_s: f64) -> CameraFlight {
    let rect = rect.expanded_to_min(MIN_RECT_SPAN_DEG);
    let (lat, lon) = rect.center();
    let span_deg = rect.width().max(rect.height());
    let span_m = span_deg.to_radians() * WGS84_A;
    let altitude = (span_m / 2.0 / (DEFAULT_FOV_Y_RAD / 2.0).tan()).clamp(1_000.0, 25_000_000.0);
    look_down_flight(Geodetic::new(lat, lon, altitude), duration_s)
}

/// Focus a celestial body: stand off proportionally to its radius and look
/// back toward it.
pub fn focus_body(center: Vec3, radius: f64) -> CameraFlight {
    let standoff = radius * FOCUS_DISTANCE_FACTOR;
    let destination = center + Vec3::new(standoff, 0.0, standoff * 0.3);
    let direction = (center - destination)
        .normalized()
        .unwrap_or(Vec3::new(-1.0, 0.0, 0.0));
    CameraFlight {
        destination,
        direction,
        up: Vec3::UNIT_Z,
        duration_s: 2.0,
        easing: Easing::Linear,
    }
}

/// The whole-system overview shot, framed on Saturn.
pub fn system_overview(saturn_center: Vec3) -> CameraFlight {
    let destination = Vec3::new(-3.0e6, -12.0e6, 2.0e6);
    let direction = (saturn_center - destination)
        .normalized()
        .unwrap_or(Vec3::new(0.0, 1.0, 0.0));
    CameraFlight {
        destination,
        direction,
        up: Vec3::UNIT_Z,
        duration_s: 1.5,
        easing: Easing::Linear,
    }
}

/// The close Earth approach used when handing off to the globe view.
pub fn earth_approach(center: Vec3, radius: f64) -> CameraFlight {
    let destination = center + Vec3::new(radius * 1.2, 0.0, radius * 0.3);
    let direction = (center - destination)
        .normalized()
        .unwrap_or(Vec3::new(-1.0, 0.0, 0.0));
    CameraFlight {
        destination,
        direction,
        up: Vec3::UNIT_Z,
        duration_s: 1.5,
        easing: Easing::CubicInOut,
    }
}
