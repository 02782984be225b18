//! Search limits and the shared stop signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Nodes a worker searches between two looks at the clock and budget.
pub const POLL_INTERVAL: u64 = 1024;

/// What bounds a search. Unset fields impose no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub nodes: Option<u64>,
    /// Fixed time for the whole search; sets both soft and hard limits.
    pub movetime: Option<Duration>,
    /// No new iteration starts past this.
    pub soft_time: Option<Duration>,
    /// The search is aborted past this.
    pub hard_time: Option<Duration>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> SearchLimits {
        SearchLimits {
            depth: Some(depth),
            ..SearchLimits::default()
        }
    }

    pub fn nodes(nodes: u64) -> SearchLimits {
        SearchLimits {
            nodes: Some(nodes),
            ..SearchLimits::default()
        }
    }

    pub fn movetime(time: Duration) -> SearchLimits {
        SearchLimits {
            movetime: Some(time),
            ..SearchLimits::default()
        }
    }

    fn soft(&self) -> Option<Duration> {
        min_some(self.soft_time, self.movetime)
    }

    fn hard(&self) -> Option<Duration> {
        min_some(self.hard_time, self.movetime)
    }
}

fn min_some(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Shared by every worker of one search.
///
/// Workers report nodes in batches of [`POLL_INTERVAL`]; the batch that
/// crosses the hard deadline or the node budget raises the stop flag.
#[derive(Debug)]
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
    node_limit: Option<u64>,
    nodes: AtomicU64,
}

impl SearchControl {
    pub fn new(limits: &SearchLimits, stopped: Arc<AtomicBool>) -> SearchControl {
        SearchControl {
            stopped,
            start: Instant::now(),
            soft_limit: limits.soft(),
            hard_limit: limits.hard(),
            node_limit: limits.nodes,
            nodes: AtomicU64::new(0),
        }
    }

    /// Only the external flag can stop this search.
    pub fn infinite(stopped: Arc<AtomicBool>) -> SearchControl {
        SearchControl::new(&SearchLimits::default(), stopped)
    }

    /// Add a worker's node batch and decide whether everyone must stop.
    pub fn poll(&self, batch: u64) -> bool {
        let total = self.nodes.fetch_add(batch, Ordering::Relaxed) + batch;
        if self.is_stopped() {
            return true;
        }
        let over_budget = self.node_limit.is_some_and(|limit| total >= limit);
        let over_time = self.hard_limit.is_some_and(|hard| self.elapsed() >= hard);
        if over_budget || over_time {
            self.stop();
            return true;
        }
        false
    }

    /// Report a worker's leftover nodes without testing the limits.
    pub fn add_nodes(&self, nodes: u64) {
        self.nodes.fetch_add(nodes, Ordering::Relaxed);
    }

    /// Nodes reported so far by all workers.
    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Whether a new iteration should not be started.
    pub fn should_stop_iterating(&self) -> bool {
        self.is_stopped() || self.soft_limit.is_some_and(|soft| self.elapsed() >= soft)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_budget_raises_the_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let control = SearchControl::new(&SearchLimits::nodes(3000), Arc::clone(&flag));
        assert!(!control.poll(POLL_INTERVAL));
        assert!(!control.poll(POLL_INTERVAL));
        assert!(control.poll(POLL_INTERVAL));
        assert!(flag.load(Ordering::Relaxed));
        assert_eq!(control.nodes(), 3 * POLL_INTERVAL);
    }

    #[test]
    fn external_flag_is_honoured() {
        let flag = Arc::new(AtomicBool::new(false));
        let control = SearchControl::infinite(Arc::clone(&flag));
        assert!(!control.poll(1));
        assert!(!control.should_stop_iterating());
        flag.store(true, Ordering::Relaxed);
        assert!(control.poll(1));
        assert!(control.should_stop_iterating());
    }

    #[test]
    fn zero_movetime_stops_at_once() {
        let control = SearchControl::new(
            &SearchLimits::movetime(Duration::ZERO),
            Arc::new(AtomicBool::new(false)),
        );
        assert!(control.should_stop_iterating());
        assert!(control.poll(1));
    }

    #[test]
    fn movetime_tightens_explicit_limits() {
        let limits = SearchLimits {
            movetime: Some(Duration::from_millis(50)),
            soft_time: Some(Duration::from_millis(20)),
            hard_time: Some(Duration::from_secs(9)),
            ..SearchLimits::default()
        };
        assert_eq!(limits.soft(), Some(Duration::from_millis(20)));
        assert_eq!(limits.hard(), Some(Duration::from_millis(50)));
    }
}
