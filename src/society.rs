//! The society collaborator contract: outbreak-management policy and testing queues.
//!
//! The engine only ever drives a society through this trait; the policy internals (who gets
//! tested, who is told to isolate) belong to the implementation. A society is parameterized by
//! the population type it manages so concrete implementations pair up with their population.

use crate::config::Config;

/// One administered test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Test {
    /// The swab has been taken; the subject is waiting for a result.
    pub swab_taken: bool,
    /// Result of the test, meaningful once completed.
    pub positive: bool,
}

/// A testing queue. The recorder reads completed tests and per-test swab status; everything
/// else about queue processing is the society's business.
pub trait TestQueue {
    /// Tests fully processed during the current period.
    fn completed_tests(&self) -> &[Test];

    /// Tests still queued. Per-test swab status decides who counts as waiting for results.
    fn pending_tests(&self) -> &[Test];
}

pub trait Society<P> {
    type Queue: TestQueue;

    /// Drops all pending queue work so a new outbreak starts from a clean slate.
    fn clear_queues(&mut self);

    /// Applies this period's outbreak-management policy (testing, isolation, interventions)
    /// to the population. Decisions taken here are visible to the same period's attack step.
    fn manage_outbreak(&mut self, population: &mut P);

    /// Size of each contact cluster formed per period.
    fn encounter_size(&self) -> usize;

    /// Number of discrete periods per simulated day. The engine rejects a zero value at
    /// setup; the recorder tolerates one.
    fn episodes_per_day(&self) -> u32;

    fn queues(&self) -> &[Self::Queue];

    /// Configuration snapshot, cloned onto the recorder at finalization for audit.
    fn config(&self) -> &Config;
}
