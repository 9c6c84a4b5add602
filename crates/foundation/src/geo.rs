/// Geographic rectangle in degrees: west/south/east/north edges.
///
/// Degenerate (zero-area) rects are legal; `expanded_to_min` grows them
/// before they are used as flight targets.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoRect {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoRect {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn from_center_size(center_lat: f64, center_lon: f64, width: f64, height: f64) -> Self {
        Self {
            west: center_lon - width / 2.0,
            south: center_lat - height / 2.0,
            east: center_lon + width / 2.0,
            north: center_lat + height / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// (lat, lon) center.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Grow either axis to at least `min_span` degrees, keeping the center.
    pub fn expanded_to_min(&self, min_span: f64) -> Self {
        let (lat, lon) = self.center();
        let width = self.width().max(min_span);
        let height = self.height().max(min_span);
        Self::from_center_size(lat, lon, width, height)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }
}
