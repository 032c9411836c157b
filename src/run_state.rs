use std::sync::atomic::{AtomicBool, Ordering};

/// Shared gate deciding whether metrics sampling is active.
///
/// Initialized enabled; flipped only by the start/stop endpoints and read at
/// the top of every metrics request. Atomic load/store, so concurrent
/// toggles and reads never observe a torn value.
#[derive(Debug)]
pub struct RunState {
    enabled: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        RunState {
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_enabled() {
        assert!(RunState::new().is_enabled());
    }

    #[test]
    fn toggling_is_idempotent() {
        let state = RunState::new();
        state.set_enabled(false);
        state.set_enabled(false);
        assert!(!state.is_enabled());
        state.set_enabled(true);
        state.set_enabled(true);
        assert!(state.is_enabled());
    }
}
