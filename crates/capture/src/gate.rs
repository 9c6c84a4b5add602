use std::sync::atomic::{AtomicBool, Ordering};

/// The in-flight capture operation guard.
///
/// Screenshot and comparison flows share the single attached overlay;
/// letting two of them interleave overlay swaps would race. The gate makes
/// the critical section explicit: a second operation is rejected with
/// `Busy` while one is in flight, instead of silently interleaving.
#[derive(Debug, Default)]
pub struct OpGate {
    busy: AtomicBool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("another capture operation is already in flight")]
pub struct Busy;

/// Held for the duration of one capture/comparison flow; releases on drop.
#[derive(Debug)]
pub struct OpGuard<'a> {
    gate: &'a OpGate,
}

impl OpGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Result<OpGuard<'_>, Busy> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(Busy);
        }
        Ok(OpGuard { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::{Busy, OpGate};

    #[test]
    fn second_operation_is_rejected_while_busy() {
        let gate = OpGate::new();
        let guard = gate.try_begin().expect("first");
        assert_eq!(gate.try_begin().unwrap_err(), Busy);
        assert!(gate.is_busy());
        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_ok());
    }
}
