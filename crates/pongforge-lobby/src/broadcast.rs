//! Per-tick work: physics for every match, then snapshots and the lobby
//! summary.

use crate::SessionCoordinator;

/// What one tick did, for trace logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Matches advanced.
    pub matches: usize,
    /// Snapshot frames queued across all matches.
    pub snapshots: usize,
    /// Lobby summary frames queued.
    pub summaries: usize,
}

impl SessionCoordinator {
    /// Runs one tick.
    ///
    /// Every ball moves before any frame is queued, so all snapshots of a
    /// tick describe the same instant. The lobby summary goes out every tick
    /// even when nothing changed.
    pub fn tick(&mut self) -> TickReport {
        let field = self.field;
        for running in self.matches.values_mut() {
            running.advance(&field);
        }

        let snapshots: usize = self
            .matches
            .values()
            .map(|running| self.registry.broadcast(running.members(), running.snapshot()))
            .sum();
        let summaries = self.broadcast_summary();

        let report = TickReport {
            matches: self.matches.len(),
            snapshots,
            summaries,
        };
        tracing::trace!(?report, "tick broadcast");
        report
    }
}
