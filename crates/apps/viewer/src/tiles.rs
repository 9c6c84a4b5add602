//! Remote tile fetching for the software renderer.
//!
//! `apply_overlay` kicks off one background fetch pass per overlay; results
//! land in a shared `TileStore` and are drained into overlay health on the
//! next render. Stale passes (an overlay replaced mid-fetch) are keyed out
//! by fetch id.

use std::sync::Arc;

use foundation::math::Geodetic;
use layers::{OverlaySpec, TileCoord, TileTemplate};
use parking_lot::Mutex;
use tracing::debug;

/// Fetch at most this many tiles per overlay pass.
pub const MAX_TILES_PER_PASS: usize = 16;

/// Highest tile level the preview renderer requests.
pub const MAX_LEVEL: u32 = 6;

#[derive(Debug, Clone)]
pub struct TileImage {
    pub coord: TileCoord,
    pub rgba: image::RgbaImage,
}

#[derive(Debug, Default)]
pub struct TileStore {
    pub fetch_id: u64,
    pub expected: usize,
    pub tiles: Vec<TileImage>,
    /// Settle outcomes not yet folded into overlay health.
    pub settles: Vec<bool>,
    pub done: bool,
    pub provider_ready: Option<bool>,
}

impl TileStore {
    /// Begin a new fetch pass, invalidating any in-flight one.
    pub fn begin_pass(&mut self, expected: usize) -> u64 {
        self.fetch_id += 1;
        self.expected = expected;
        self.tiles.clear();
        self.settles.clear();
        self.done = expected == 0;
        self.provider_ready = if expected == 0 { Some(true) } else { None };
        self.fetch_id
    }
}

/// Zoom level from camera altitude: halve the altitude, gain a level.
pub fn level_for_altitude(altitude_m: f64) -> u32 {
    let level = (20_000_000.0 / altitude_m.max(1.0)).log2().floor() as i64;
    level.clamp(0, MAX_LEVEL as i64) as u32
}

/// Tiles around the camera subpoint at the given level, capped to
/// `MAX_TILES_PER_PASS`. Columns wrap; rows clamp at the grid edge.
pub fn coords_around(center: Geodetic, level: u32) -> Vec<TileCoord> {
    let Some(center_tile) = TileCoord::containing(center, level) else {
        return Vec::new();
    };
    let n = TileCoord::tiles_per_axis(level) as i64;
    let mut radius = 0i64;
    while (2 * (radius + 1) + 1).pow(2) as usize <= MAX_TILES_PER_PASS && radius + 1 < n {
        radius += 1;
    }

    let mut coords = Vec::new();
    for dr in -radius..=radius {
        let row = center_tile.row as i64 + dr;
        if row < 0 || row >= n {
            continue;
        }
        for dc in -radius..=radius {
            let col = (center_tile.col as i64 + dc).rem_euclid(n);
            coords.push(TileCoord::new(level, row as u32, col as u32));
        }
    }
    coords.sort();
    coords.dedup();
    coords.truncate(MAX_TILES_PER_PASS);
    coords
}

/// Fetch every coord and record settles in the store. Runs as a spawned
/// task; drops its results silently once the pass is stale.
pub async fn fetch_pass(
    http: reqwest::Client,
    template: TileTemplate,
    spec: OverlaySpec,
    coords: Vec<TileCoord>,
    store: Arc<Mutex<TileStore>>,
    fetch_id: u64,
) {
    let mut any_success = false;
    for coord in coords {
        let url = template.tile_url(&spec, coord);
        let fetched = fetch_tile(&http, &url).await;
        let ok = fetched.is_ok();
        any_success |= ok;

        let mut store = store.lock();
        if store.fetch_id != fetch_id {
            debug!("dropping stale tile pass result for {url}");
            return;
        }
        store.settles.push(ok);
        if let Ok(rgba) = fetched {
            store.tiles.push(TileImage { coord, rgba });
        }
    }

    let mut store = store.lock();
    if store.fetch_id == fetch_id {
        store.done = true;
        store.provider_ready = Some(any_success);
    }
}

async fn fetch_tile(http: &reqwest::Client, url: &str) -> Result<image::RgbaImage, String> {
    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|err| err.to_string())?
        .error_for_status()
        .map_err(|err| err.to_string())?;
    let bytes = resp.bytes().await.map_err(|err| err.to_string())?;
    image::load_from_memory(&bytes)
        .map(|img| img.to_rgba8())
        .map_err(|err| err.to_string())
}
