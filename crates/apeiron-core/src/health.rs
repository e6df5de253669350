//! Shared platform-connection health flags.
//!
//! The Discord handler flips these; the HTTP probes read them. Liveness
//! stays healthy unless the connection is confirmed closed; readiness
//! requires the gateway to have reported ready at least once.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ConnectionHealth {
    ready: AtomicBool,
    closed: AtomicBool,
}

impl ConnectionHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Relaxed);
        self.closed.store(false, Ordering::Relaxed);
    }

    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neither_ready_nor_closed() {
        let health = ConnectionHealth::new();
        assert!(!health.is_ready());
        assert!(!health.is_closed());
    }

    #[test]
    fn ready_clears_closed() {
        let health = ConnectionHealth::new();
        health.mark_closed();
        health.mark_ready();
        assert!(health.is_ready());
        assert!(!health.is_closed());
    }
}
