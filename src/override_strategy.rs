//! Deciding whether a mock handles a request.

use crate::mock::Mock;
use crate::network::NetworkRequest;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Decides whether `mock` should answer `request` instead of the network.
///
/// Called for every registered mock, in order, until one returns `true`.
/// Implementations must be safe to call from concurrent requests.
pub trait OverrideStrategy: Send + Sync {
    /// Decide for a request being dispatched. Stateful strategies record
    /// the match here.
    fn should_override(&self, mock: &dyn Mock, request: &NetworkRequest) -> bool;

    /// The answer `should_override` would give right now, without recording
    /// anything. Stateful strategies must override this.
    fn would_override(&self, mock: &dyn Mock, request: &NetworkRequest) -> bool {
        self.should_override(mock, request)
    }
}

/// Matches requests equal to a reference request.
#[derive(Debug, Clone)]
pub struct CompareOverrideStrategy {
    request: NetworkRequest,
}

impl CompareOverrideStrategy {
    pub fn new(request: NetworkRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &NetworkRequest {
        &self.request
    }
}

impl OverrideStrategy for CompareOverrideStrategy {
    fn should_override(&self, _mock: &dyn Mock, request: &NetworkRequest) -> bool {
        self.request == *request
    }
}

/// Matches requests accepted by a closure.
pub struct PredicateOverrideStrategy<F> {
    predicate: F,
}

impl<F> PredicateOverrideStrategy<F>
where
    F: Fn(&NetworkRequest) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> OverrideStrategy for PredicateOverrideStrategy<F>
where
    F: Fn(&NetworkRequest) -> bool + Send + Sync,
{
    fn should_override(&self, _mock: &dyn Mock, request: &NetworkRequest) -> bool {
        (self.predicate)(request)
    }
}

impl<F> fmt::Debug for PredicateOverrideStrategy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateOverrideStrategy").finish_non_exhaustive()
    }
}

/// Stops matching once the inner strategy has matched `max_matches` times.
///
/// After that the request falls through to the next mock or to the network.
pub struct LimitedOverrideStrategy {
    inner: Arc<dyn OverrideStrategy>,
    max_matches: u32,
    matched: AtomicU32,
}

impl LimitedOverrideStrategy {
    pub fn new(inner: Arc<dyn OverrideStrategy>, max_matches: u32) -> Self {
        Self {
            inner,
            max_matches,
            matched: AtomicU32::new(0),
        }
    }

    /// Number of requests this strategy has let through so far.
    pub fn matched(&self) -> u32 {
        self.matched.load(Ordering::Relaxed)
    }

    pub fn is_exhausted(&self) -> bool {
        self.matched() >= self.max_matches
    }
}

impl OverrideStrategy for LimitedOverrideStrategy {
    fn should_override(&self, mock: &dyn Mock, request: &NetworkRequest) -> bool {
        if self.is_exhausted() || !self.inner.should_override(mock, request) {
            return false;
        }
        self.matched
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < self.max_matches).then_some(count + 1)
            })
            .is_ok()
    }

    fn would_override(&self, mock: &dyn Mock, request: &NetworkRequest) -> bool {
        !self.is_exhausted() && self.inner.would_override(mock, request)
    }
}

impl fmt::Debug for LimitedOverrideStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitedOverrideStrategy")
            .field("max_matches", &self.max_matches)
            .field("matched", &self.matched())
            .finish_non_exhaustive()
    }
}
