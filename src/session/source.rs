//! Inbound collaborators: the draft snapshot source and the data source availability gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::RuleDraft;

/// Read access to the rule under edit. Called once per trigger.
pub trait DraftSource: Send + Sync + 'static {
    fn snapshot(&self) -> RuleDraft;
}

impl<F> DraftSource for F
where
    F: Fn() -> RuleDraft + Send + Sync + 'static,
{
    fn snapshot(&self) -> RuleDraft {
        self()
    }
}

/// Whether every data source referenced by the draft's queries is reachable right now.
pub trait DataSourceGate: Send + Sync + 'static {
    fn all_data_sources_available(&self) -> bool;
}

impl<F> DataSourceGate for F
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn all_data_sources_available(&self) -> bool {
        self()
    }
}

/// Gate with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGate(pub bool);

impl DataSourceGate for StaticGate {
    fn all_data_sources_available(&self) -> bool {
        self.0
    }
}

/// Gate whose answer is updated by whoever watches the queries.
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct SharedGate(Arc<AtomicBool>);

impl SharedGate {
    pub fn new(available: bool) -> Self {
        Self(Arc::new(AtomicBool::new(available)))
    }

    pub fn set(&self, available: bool) {
        self.0.store(available, Ordering::SeqCst);
    }
}

impl Default for SharedGate {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DataSourceGate for SharedGate {
    fn all_data_sources_available(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleKind;

    #[test]
    fn closures_act_as_sources_and_gates() {
        let source = || RuleDraft::new(RuleKind::CloudAlerting);
        assert_eq!(source.snapshot().kind, RuleKind::CloudAlerting);

        let gate = || false;
        assert!(!gate.all_data_sources_available());
    }

    #[test]
    fn shared_gate_clones_observe_updates() {
        let gate = SharedGate::new(true);
        let observer = gate.clone();
        gate.set(false);
        assert!(!observer.all_data_sources_available());
    }
}
