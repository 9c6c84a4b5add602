//! The viewer runtime: owns the scene, the overlay manager, and a software
//! plate renderer over remote tiles, and exposes the capture seam.

use std::sync::Arc;
use std::time::Instant;

use capture::{CapturedImage, FrameError, SceneFrame};
use parking_lot::Mutex;
use foundation::math::{Geodetic, ecef_to_geodetic};
use foundation::time::Time;
use layers::{LayerId, OverlayManager, OverlaySpec, TileTemplate};
use scene::viewport::ViewportTracker;
use scene::{SceneViewer, ViewMode};

use crate::tiles::{self, TileStore, coords_around, fetch_pass, level_for_altitude};

/// Web-mercator latitude limit for the preview projection.
const MERCATOR_LAT_LIMIT: f64 = 85.051_13;

pub struct ViewerRuntime {
    pub viewer: SceneViewer,
    pub overlays: OverlayManager,
    pub tracker: ViewportTracker,
    template: TileTemplate,
    http: reqwest::Client,
    started: Instant,
    store: Arc<Mutex<TileStore>>,
    framebuffer: image::RgbaImage,
    current_layer: Option<LayerId>,
    /// Skip network fetches; overlays become ready with no tiles.
    offline: bool,
}

impl ViewerRuntime {
    pub fn new(
        mode: ViewMode,
        template: TileTemplate,
        http: reqwest::Client,
        width: u32,
        height: u32,
        offline: bool,
    ) -> Self {
        let mut viewer = SceneViewer::new(mode);
        viewer.camera.resize(width as f64, height as f64);
        // The base map is synthesized locally, so its tiles are always
        // "loaded"; readiness hinges on the overlay fetch pass.
        viewer.globe.set_tiles_loaded(true);
        Self {
            viewer,
            overlays: OverlayManager::new(),
            tracker: ViewportTracker::new(Time(0.0)),
            template,
            http,
            started: Instant::now(),
            store: Arc::new(Mutex::new(TileStore::default())),
            framebuffer: image::RgbaImage::new(width, height),
            current_layer: None,
            offline,
        }
    }

    pub fn now(&self) -> Time {
        Time(self.started.elapsed().as_secs_f64())
    }

    /// Tear down the current viewer and bring up the requested mode.
    pub fn switch_mode(&mut self, mode: ViewMode) {
        let (width, height) = self.framebuffer.dimensions();
        let old = std::mem::replace(&mut self.viewer, SceneViewer::new(mode));
        self.viewer = old.recreate(mode);
        self.viewer.camera.resize(width as f64, height as f64);
        self.viewer.globe.set_tiles_loaded(true);
        self.overlays.detach();
        self.current_layer = None;
        self.tracker = ViewportTracker::new(self.now());
        self.store.lock().begin_pass(0);
    }

    pub fn camera_geodetic(&self) -> Geodetic {
        ecef_to_geodetic(self.viewer.camera.position)
    }

    /// Fold pending settle results into overlay health.
    fn drain_settles(&mut self) {
        let (settles, provider_ready) = {
            let mut store = self.store.lock();
            (
                std::mem::take(&mut store.settles),
                store.provider_ready.take(),
            )
        };
        let Some(layer_id) = self.current_layer else {
            return;
        };
        let now = self.now();
        for ok in settles {
            self.overlays.on_tile_result(layer_id, ok, now);
        }
        if let Some(ready) = provider_ready {
            self.overlays.on_provider_ready(layer_id, ready);
        }
    }

    /// Repaint the framebuffer: base tint, overlay tiles, markers.
    fn compose(&mut self) {
        let (width, height) = self.framebuffer.dimensions();
        let base = if self.viewer.globe.show {
            color_to_rgba(self.viewer.globe.base_color)
        } else {
            [0, 0, 0, 255]
        };
        for px in self.framebuffer.pixels_mut() {
            px.0 = base;
        }

        if let Some(layer) = self.overlays.attached() {
            if layer.show && self.viewer.globe.show {
                let alpha = layer.alpha;
                let store = self.store.lock();
                for tile in &store.tiles {
                    blend_tile(&mut self.framebuffer, tile, alpha);
                }
            }
        }

        if self.viewer.globe.show {
            let markers: Vec<Geodetic> = self
                .viewer
                .globe
                .markers
                .iter()
                .map(|m| m.position)
                .collect();
            for position in markers {
                if let Some((x, y)) = project(position, width, height) {
                    draw_dot(&mut self.framebuffer, x, y);
                }
            }
        }
    }
}

impl SceneFrame for ViewerRuntime {
    fn generation(&self) -> u64 {
        self.viewer.generation()
    }

    fn is_destroyed(&self) -> bool {
        self.viewer.is_destroyed()
    }

    fn imagery_ready(&self) -> bool {
        if self.overlays.attached().is_none() {
            return self.viewer.globe.tiles_loaded();
        }
        let store = self.store.lock();
        store.done && self.viewer.globe.tiles_loaded()
    }

    fn attached_overlay(&self) -> Option<OverlaySpec> {
        self.overlays.attached_spec().cloned()
    }

    fn apply_overlay(&mut self, spec: &OverlaySpec) {
        let now = self.now();
        let id = self.overlays.apply_overlay(spec.clone(), now);
        self.current_layer = Some(id);

        let center = self.camera_geodetic();
        let level = level_for_altitude(center.height_m);
        let coords = if self.offline {
            Vec::new()
        } else {
            coords_around(Geodetic::new(center.lat_deg, center.lon_deg, 0.0), level)
        };

        let fetch_id = {
            let mut store = self.store.lock();
            store.begin_pass(coords.len())
        };
        if !coords.is_empty() {
            tokio::spawn(fetch_pass(
                self.http.clone(),
                self.template.clone(),
                spec.clone(),
                coords,
                Arc::clone(&self.store),
                fetch_id,
            ));
        }
    }

    async fn render(&mut self) -> Result<(), FrameError> {
        if self.viewer.is_destroyed() {
            return Err(FrameError::Render("viewer destroyed".into()));
        }
        self.drain_settles();
        self.compose();
        self.tracker.update(&self.viewer, self.now());
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<CapturedImage, FrameError> {
        let (width, height) = self.framebuffer.dimensions();
        CapturedImage::from_rgba(width, height, self.framebuffer.as_raw())
    }
}

fn color_to_rgba(color: [f32; 4]) -> [u8; 4] {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        channel(color[3]),
    ]
}

/// World-mercator pixel for a geodetic point, `None` beyond the projection.
fn project(geo: Geodetic, width: u32, height: u32) -> Option<(u32, u32)> {
    if geo.lat_deg.abs() > MERCATOR_LAT_LIMIT {
        return None;
    }
    let x = (geo.lon_deg + 180.0) / 360.0;
    let lat_rad = geo.lat_deg.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
    let px = ((x * width as f64) as u32).min(width - 1);
    let py = ((y * height as f64) as u32).min(height - 1);
    Some((px, py))
}

fn blend_tile(fb: &mut image::RgbaImage, tile: &tiles::TileImage, alpha: f64) {
    let (fb_w, fb_h) = fb.dimensions();
    let n = layers::TileCoord::tiles_per_axis(tile.coord.level) as f64;
    let x0 = (tile.coord.col as f64 / n * fb_w as f64) as u32;
    let x1 = (((tile.coord.col + 1) as f64 / n * fb_w as f64) as u32).min(fb_w);
    let y0 = (tile.coord.row as f64 / n * fb_h as f64) as u32;
    let y1 = (((tile.coord.row + 1) as f64 / n * fb_h as f64) as u32).min(fb_h);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let (tw, th) = tile.rgba.dimensions();
    for y in y0..y1 {
        let v = (y - y0) as f64 / (y1 - y0) as f64;
        let ty = ((v * th as f64) as u32).min(th - 1);
        for x in x0..x1 {
            let u = (x - x0) as f64 / (x1 - x0) as f64;
            let tx = ((u * tw as f64) as u32).min(tw - 1);
            let src = tile.rgba.get_pixel(tx, ty).0;
            let a = alpha * src[3] as f64 / 255.0;
            let dst = fb.get_pixel_mut(x, y);
            for c in 0..3 {
                dst.0[c] =
                    (dst.0[c] as f64 * (1.0 - a) + src[c] as f64 * a).round() as u8;
            }
        }
    }
}

fn draw_dot(fb: &mut image::RgbaImage, x: u32, y: u32) {
    let (w, h) = fb.dimensions();
    for dy in 0..3u32 {
        for dx in 0..3u32 {
            let px = (x + dx).saturating_sub(1).min(w - 1);
            let py = (y + dy).saturating_sub(1).min(h - 1);
            fb.put_pixel(px, py, image::Rgba([255, 255, 255, 255]));
        }
    }
}
