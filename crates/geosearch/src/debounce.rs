use foundation::time::Time;

/// Delay between the last keystroke and the issued query (seconds).
pub const DEBOUNCE_DELAY_S: f64 = 0.3;

/// Keystroke debouncer: each input restarts the timer; `poll` fires the
/// query once the delay has passed; `flush` bypasses the timer entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer {
    delay_s: f64,
    pending: Option<(String, Time)>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_delay(DEBOUNCE_DELAY_S)
    }

    pub fn with_delay(delay_s: f64) -> Self {
        Self {
            delay_s,
            pending: None,
        }
    }

    pub fn input(&mut self, query: impl Into<String>, now: Time) {
        self.pending = Some((query.into(), now));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The query to issue now, if its debounce window has elapsed.
    pub fn poll(&mut self, now: Time) -> Option<String> {
        let (_, since) = self.pending.as_ref()?;
        if now.seconds_since(*since) < self.delay_s {
            return None;
        }
        self.pending.take().map(|(query, _)| query)
    }

    /// Fire the pending query immediately, ignoring the timer.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(query, _)| query)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use foundation::time::Time;

    #[test]
    fn fires_only_after_the_delay() {
        let mut debouncer = Debouncer::with_delay(0.3);
        debouncer.input("par", Time(0.0));
        assert_eq!(debouncer.poll(Time(0.1)), None);
        assert_eq!(debouncer.poll(Time(0.31)), Some("par".to_string()));
        assert_eq!(debouncer.poll(Time(0.4)), None);
    }

    #[test]
    fn new_input_restarts_the_window() {
        let mut debouncer = Debouncer::with_delay(0.3);
        debouncer.input("par", Time(0.0));
        debouncer.input("pari", Time(0.2));
        // 0.31 is past the first window but not the second.
        assert_eq!(debouncer.poll(Time(0.31)), None);
        assert_eq!(debouncer.poll(Time(0.51)), Some("pari".to_string()));
    }

    #[test]
    fn flush_bypasses_the_timer() {
        let mut debouncer = Debouncer::with_delay(0.3);
        debouncer.input("paris", Time(0.0));
        assert_eq!(debouncer.flush(), Some("paris".to_string()));
        assert!(!debouncer.is_pending());
    }
}
