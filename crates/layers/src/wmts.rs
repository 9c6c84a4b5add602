use foundation::math::Geodetic;

use crate::layer::OverlaySpec;

/// Default remote tile host.
pub const DEFAULT_TILE_HOST: &str = "gibs.earthdata.nasa.gov";

/// Default tile matrix set for the EPSG:3857 endpoint.
pub const DEFAULT_TILE_MATRIX_SET: &str = "GoogleMapsCompatible_Level9";

/// Tile address in ZXY scheme (web-mercator grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub level: u32,
    pub row: u32,
    pub col: u32,
}

impl TileCoord {
    pub fn new(level: u32, row: u32, col: u32) -> Self {
        Self { level, row, col }
    }

    /// Tiles per axis at this level.
    pub fn tiles_per_axis(level: u32) -> u32 {
        1 << level
    }

    /// The tile containing a geodetic point at the given level.
    /// `None` outside the web-mercator latitude range.
    pub fn containing(geo: Geodetic, level: u32) -> Option<Self> {
        if !(-85.051_13..=85.051_13).contains(&geo.lat_deg) {
            return None;
        }
        let n = Self::tiles_per_axis(level) as f64;
        let col = ((geo.lon_deg + 180.0) / 360.0 * n).floor();
        let lat_rad = geo.lat_deg.to_radians();
        let row = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI)
            / 2.0
            * n)
            .floor();
        let max = n - 1.0;
        Some(Self::new(
            level,
            row.clamp(0.0, max) as u32,
            col.clamp(0.0, max) as u32,
        ))
    }

    /// Geographic bounds (west, south, east, north) in degrees.
    pub fn bounds_deg(&self) -> (f64, f64, f64, f64) {
        let n = Self::tiles_per_axis(self.level) as f64;
        let west = self.col as f64 / n * 360.0 - 180.0;
        let east = (self.col + 1) as f64 / n * 360.0 - 180.0;
        let north = row_to_lat(self.row, self.level);
        let south = row_to_lat(self.row + 1, self.level);
        (west, south, east, north)
    }
}

fn row_to_lat(row: u32, level: u32) -> f64 {
    let n = std::f64::consts::PI
        - 2.0 * std::f64::consts::PI * row as f64 / TileCoord::tiles_per_axis(level) as f64;
    (0.5 * (n.exp() - (-n).exp())).atan().to_degrees()
}

/// The remote WMTS endpoint shape:
/// `https://<host>/wmts/epsg3857/best/{layer}/default/{time}/{tms}/{level}/{row}/{col}.{ext}`
/// where `{time}` is the literal `default` or a `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTemplate {
    pub host: String,
    pub tile_matrix_set: String,
}

impl Default for TileTemplate {
    fn default() -> Self {
        Self {
            host: DEFAULT_TILE_HOST.to_string(),
            tile_matrix_set: DEFAULT_TILE_MATRIX_SET.to_string(),
        }
    }
}

impl TileTemplate {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn tile_url(&self, spec: &OverlaySpec, coord: TileCoord) -> String {
        format!(
            "https://{host}/wmts/epsg3857/best/{layer}/default/{time}/{tms}/{level}/{row}/{col}.{ext}",
            host = self.host,
            layer = spec.layer,
            time = spec.time.wmts_token(),
            tms = self.tile_matrix_set,
            level = coord.level,
            row = coord.row,
            col = coord.col,
            ext = spec.format.ext(),
        )
    }
}
