//! Throttled recurring tasks.
//!
//! Expensive scans (membership, inventory reachability) run far below the
//! simulation frame rate. A [`Throttle`] remembers when its task last ran
//! and which execution context it belongs to; the scheduler polls
//! [`ThrottledTask::can_run`], calls `handle`, then resets the timer.

/// Where a piece of code is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecContext {
    /// Authoritative simulation (dedicated server or host).
    Server,
    /// Replicated view.
    Client,
}

/// Which context a task is allowed to run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    ServerOnly,
    ClientOnly,
}

impl Affinity {
    pub fn matches(self, ctx: ExecContext) -> bool {
        matches!(
            (self, ctx),
            (Affinity::ServerOnly, ExecContext::Server) | (Affinity::ClientOnly, ExecContext::Client)
        )
    }
}

/// Polling interval plus affinity.
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Seconds between runs.
    resolution: f64,
    affinity: Affinity,
    last_run: Option<f64>,
}

impl Throttle {
    pub fn new(resolution: f64, affinity: Affinity) -> Self {
        Self {
            resolution: resolution.max(0.0),
            affinity,
            last_run: None,
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// True once `resolution` seconds have passed since the last reset (or
    /// immediately if never run) and the context matches.
    pub fn can_run(&self, now: f64, ctx: ExecContext) -> bool {
        if !self.affinity.matches(ctx) {
            return false;
        }
        match self.last_run {
            None => true,
            Some(last) => now - last >= self.resolution,
        }
    }

    pub fn reset(&mut self, now: f64) {
        self.last_run = Some(now);
    }

    /// Forget the last run so the next poll fires immediately.
    pub fn rearm(&mut self) {
        self.last_run = None;
    }
}

/// A unit of recurring work over some shared context `C`.
pub trait ThrottledTask<C: ?Sized> {
    fn name(&self) -> &'static str;
    fn throttle(&self) -> &Throttle;
    fn throttle_mut(&mut self) -> &mut Throttle;
    fn handle(&mut self, cx: &mut C);

    fn can_run(&self, now: f64, ctx: ExecContext) -> bool {
        self.throttle().can_run(now, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_runs() {
        let t = Throttle::new(5.0, Affinity::ServerOnly);
        assert!(t.can_run(0.0, ExecContext::Server));
    }

    #[test]
    fn test_waits_for_resolution() {
        let mut t = Throttle::new(5.0, Affinity::ServerOnly);
        t.reset(10.0);
        assert!(!t.can_run(14.9, ExecContext::Server));
        assert!(t.can_run(15.0, ExecContext::Server));
    }

    #[test]
    fn test_affinity_blocks_wrong_context() {
        let server = Throttle::new(0.0, Affinity::ServerOnly);
        let client = Throttle::new(0.0, Affinity::ClientOnly);
        assert!(!server.can_run(100.0, ExecContext::Client));
        assert!(!client.can_run(100.0, ExecContext::Server));
        assert!(client.can_run(100.0, ExecContext::Client));
    }

    #[test]
    fn test_rearm() {
        let mut t = Throttle::new(60.0, Affinity::ClientOnly);
        t.reset(1.0);
        assert!(!t.can_run(2.0, ExecContext::Client));
        t.rearm();
        assert!(t.can_run(2.0, ExecContext::Client));
    }
}
