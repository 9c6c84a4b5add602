use foundation::time::Time;

use crate::health::OverlayHealth;
use crate::layer::{LayerId, OverlayLayer, OverlaySpec};

/// Default alpha overlays are attached at.
pub const DEFAULT_TARGET_ALPHA: f64 = 0.8;

/// Owns the single attached overlay above the base map.
///
/// `apply_overlay` detaches any current overlay and attaches a fresh one;
/// the base map layer is never touched. Settle callbacks carry the layer
/// handle they were issued for, so tiles of a replaced provider that settle
/// late are ignored rather than polluting the new overlay's health.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayManager {
    next_id: u64,
    target_alpha: f64,
    attached: Option<(OverlayLayer, OverlayHealth)>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::with_target_alpha(DEFAULT_TARGET_ALPHA)
    }

    pub fn with_target_alpha(target_alpha: f64) -> Self {
        Self {
            next_id: 1,
            target_alpha,
            attached: None,
        }
    }

    /// Replace the attached overlay. Does not block; tiles settle later via
    /// `on_tile_result`. Returns the new layer handle.
    pub fn apply_overlay(&mut self, spec: OverlaySpec, now: Time) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        let health = OverlayHealth::new(self.target_alpha, now);
        let layer = OverlayLayer {
            id,
            spec,
            alpha: health.alpha(),
            show: health.show(),
        };
        self.attached = Some((layer, health));
        id
    }

    /// Detach the overlay, leaving only the base map.
    pub fn detach(&mut self) {
        self.attached = None;
    }

    /// Record a tile settle for the given layer. Settles for anything but
    /// the currently attached layer are dropped.
    pub fn on_tile_result(&mut self, id: LayerId, ok: bool, now: Time) {
        if let Some((layer, health)) = self.attached.as_mut()
            && layer.id == id
        {
            health.on_tile_result(ok, now);
            layer.alpha = health.alpha();
            layer.show = health.show();
        }
    }

    /// Record the provider readiness outcome for the given layer.
    pub fn on_provider_ready(&mut self, id: LayerId, ok: bool) {
        if let Some((layer, health)) = self.attached.as_mut()
            && layer.id == id
        {
            health.on_provider_ready(ok);
            layer.alpha = health.alpha();
            layer.show = health.show();
        }
    }

    pub fn attached(&self) -> Option<&OverlayLayer> {
        self.attached.as_ref().map(|(layer, _)| layer)
    }

    pub fn attached_spec(&self) -> Option<&OverlaySpec> {
        self.attached().map(|layer| &layer.spec)
    }

    pub fn health(&self) -> Option<&OverlayHealth> {
        self.attached.as_ref().map(|(_, health)| health)
    }

    /// Number of attached overlay layers: zero or one by construction.
    pub fn layer_count(&self) -> usize {
        usize::from(self.attached.is_some())
    }

    pub fn target_alpha(&self) -> f64 {
        self.target_alpha
    }
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_TARGET_ALPHA, OverlayManager};
    use crate::layer::{ImageFormat, OverlaySpec};
    use foundation::time::{IsoDate, Time, TimeSelector};

    fn spec(date: &str) -> OverlaySpec {
        OverlaySpec::new(
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            TimeSelector::Date(IsoDate::parse(date).unwrap()),
            ImageFormat::Jpeg,
        )
    }

    #[test]
    fn applying_twice_with_same_args_leaves_one_layer_at_target_alpha() {
        let mut once = OverlayManager::new();
        once.apply_overlay(spec("2024-01-01"), Time(0.0));

        let mut twice = OverlayManager::new();
        twice.apply_overlay(spec("2024-01-01"), Time(0.0));
        twice.apply_overlay(spec("2024-01-01"), Time(0.5));

        assert_eq!(twice.layer_count(), 1);
        assert_eq!(
            twice.attached().unwrap().alpha,
            once.attached().unwrap().alpha
        );
        assert_eq!(twice.attached().unwrap().alpha, DEFAULT_TARGET_ALPHA);
        assert_eq!(twice.attached_spec(), once.attached_spec());
    }

    #[test]
    fn replacement_issues_a_fresh_handle_and_health() {
        let mut mgr = OverlayManager::new();
        let first = mgr.apply_overlay(spec("2024-01-01"), Time(0.0));

        // Degrade the first overlay.
        for i in 0..12u64 {
            mgr.on_tile_result(first, false, Time(0.1 * (i + 1) as f64));
        }
        assert!(mgr.attached().unwrap().alpha < DEFAULT_TARGET_ALPHA);

        let second = mgr.apply_overlay(spec("2024-02-01"), Time(2.0));
        assert_ne!(first, second);
        assert_eq!(mgr.attached().unwrap().alpha, DEFAULT_TARGET_ALPHA);
    }

    #[test]
    fn stale_settles_are_ignored() {
        let mut mgr = OverlayManager::new();
        let first = mgr.apply_overlay(spec("2024-01-01"), Time(0.0));
        let _second = mgr.apply_overlay(spec("2024-02-01"), Time(0.1));

        // Late failures from the detached provider must not fade the
        // replacement.
        for i in 0..20u64 {
            mgr.on_tile_result(first, false, Time(0.2 + 0.01 * i as f64));
        }
        assert_eq!(mgr.attached().unwrap().alpha, DEFAULT_TARGET_ALPHA);
    }

    #[test]
    fn provider_rejection_hides_only_the_overlay() {
        let mut mgr = OverlayManager::new();
        let id = mgr.apply_overlay(spec("2024-01-01"), Time(0.0));
        mgr.on_provider_ready(id, false);
        let layer = mgr.attached().unwrap();
        assert!(!layer.show);
        // Still attached; the base map is unaffected by construction.
        assert_eq!(mgr.layer_count(), 1);
    }

    #[test]
    fn detach_leaves_no_layers() {
        let mut mgr = OverlayManager::new();
        mgr.apply_overlay(spec("2024-01-01"), Time(0.0));
        mgr.detach();
        assert_eq!(mgr.layer_count(), 0);
        assert_eq!(mgr.attached_spec(), None);
    }
}
