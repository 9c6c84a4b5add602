use super::Vec3;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Geodetic coordinates in degrees and meters.
///
/// Degrees, not radians: every surface of this system (viewport corners,
/// search results, region-info query params) speaks degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub height_m: f64,
}

impl Geodetic {
    pub fn new(lat_deg: f64, lon_deg: f64, height_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            height_m,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.lat_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.lon_deg.to_radians()
    }
}

/// Geodetic -> earth-centered earth-fixed cartesian (meters).
pub fn geodetic_to_ecef(geo: Geodetic) -> Vec3 {
    let sin_lat = geo.lat_rad().sin();
    let cos_lat = geo.lat_rad().cos();
    let sin_lon = geo.lon_rad().sin();
    let cos_lon = geo.lon_rad().cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Vec3::new(
        (n + geo.height_m) * cos_lat * cos_lon,
        (n + geo.height_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.height_m) * sin_lat,
    )
}

/// ECEF cartesian -> geodetic, closed-form (Bowring).
pub fn ecef_to_geodetic(ecef: Vec3) -> Geodetic {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta * sin_theta * sin_theta)
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta * cos_theta * cos_theta);

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let height = if lat.cos().abs() > 1e-12 {
        p / lat.cos() - n
    } else {
        ecef.z.abs() - WGS84_B
    };

    Geodetic::new(lat.to_degrees(), lon.to_degrees(), height)
}

/// Wrap a longitude into [-180, 180).
pub fn wrap_lon_deg(lon_deg: f64) -> f64 {
    let mut lon = (lon_deg + 180.0) % 360.0;
    if lon < 0.0 {
        lon += 360.0;
    }
    lon - 180.0
}
