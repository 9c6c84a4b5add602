use foundation::time::Time;

/// Zero the counters and restore alpha when this much time has passed
/// since the last reset (seconds).
pub const RESET_INTERVAL_S: f64 = 10.0;

/// A success rate above this (with errors present) also triggers a reset.
pub const SUCCESS_RESET_RATIO: f64 = 0.5;

/// Errors beyond this count, without an intervening reset, fade the overlay.
pub const ERROR_FADE_THRESHOLD: u64 = 8;

/// Multiplicative alpha decay per faded settle.
pub const ALPHA_DECAY: f64 = 0.85;

/// Alpha never fades below this.
pub const ALPHA_FLOOR: f64 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Degraded,
    Failed,
}

/// The one policy owning overlay alpha and visibility.
///
/// Per-tile settles feed the decaying error-rate heuristic: a mostly-broken
/// overlay fades instead of sitting opaque over the base map, and recovers
/// once tiles start succeeding again. A rejected provider readiness check
/// hides the overlay outright (`Failed`); the base map stays visible either
/// way.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHealth {
    state: HealthState,
    target_alpha: f64,
    alpha: f64,
    show: bool,
    successes: u64,
    errors: u64,
    tile_requests: u64,
    last_reset: Time,
}

impl OverlayHealth {
    pub fn new(target_alpha: f64, now: Time) -> Self {
        Self {
            state: HealthState::Healthy,
            target_alpha,
            alpha: target_alpha,
            show: true,
            successes: 0,
            errors: 0,
            tile_requests: 0,
            last_reset: now,
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn target_alpha(&self) -> f64 {
        self.target_alpha
    }

    pub fn show(&self) -> bool {
        self.show
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn tile_requests(&self) -> u64 {
        self.tile_requests
    }

    /// Record one tile settle and run the decay/reset policy.
    pub fn on_tile_result(&mut self, ok: bool, now: Time) {
        self.tile_requests += 1;
        if ok {
            self.successes += 1;
        } else {
            self.errors += 1;
        }

        let success_rate = self.successes as f64 / self.tile_requests as f64;
        let stale = now.seconds_since(self.last_reset) > RESET_INTERVAL_S;
        let recovered = success_rate > SUCCESS_RESET_RATIO && self.errors > 0;

        if stale || recovered {
            self.reset(now);
        } else if self.errors > ERROR_FADE_THRESHOLD {
            self.alpha = (self.alpha * ALPHA_DECAY).max(ALPHA_FLOOR);
            if self.state == HealthState::Healthy {
                self.state = HealthState::Degraded;
            }
        }
    }

    /// Outcome of the provider's own readiness check. Rejection hides the
    /// overlay entirely; success shows it and clears a prior failure.
    pub fn on_provider_ready(&mut self, ok: bool) {
        if ok {
            self.show = true;
            if self.state == HealthState::Failed {
                self.state = HealthState::Healthy;
            }
        } else {
            self.show = false;
            self.state = HealthState::Failed;
        }
    }

    fn reset(&mut self, now: Time) {
        self.successes = 0;
        self.errors = 0;
        self.tile_requests = 0;
        self.last_reset = now;
        self.alpha = self.target_alpha;
        if self.state == HealthState::Degraded {
            self.state = HealthState::Healthy;
        }
    }
}
