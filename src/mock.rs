//! Mocked requests: a matching rule, a delay, and where the body comes from.

use crate::network::NetworkRequest;
use crate::override_strategy::{CompareOverrideStrategy, OverrideStrategy};
use crate::read_strategy::ReadStrategy;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A configured substitute response.
///
/// See [`SingleMock`] and [`RotatingMock`] for the built-in variants.
pub trait Mock: Send + Sync {
    /// Label used in logs.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Minimum time to wait before answering.
    fn delay(&self) -> Duration;

    /// The strategy that produces the body of the next response.
    fn current_read_strategy(&self) -> Arc<dyn ReadStrategy>;

    /// Whether this mock answers a given request.
    fn override_strategy(&self) -> &dyn OverrideStrategy;

    /// Shortcut for asking [`override_strategy`](Self::override_strategy) about `request`.
    fn should_override(&self, request: &NetworkRequest) -> bool
    where
        Self: Sized,
    {
        self.override_strategy().should_override(self, request)
    }
}

/// Answers every matched request from the same read strategy.
pub struct SingleMock {
    name: Option<String>,
    delay: Duration,
    read_strategy: Arc<dyn ReadStrategy>,
    override_strategy: Arc<dyn OverrideStrategy>,
}

impl SingleMock {
    pub fn new(
        read_strategy: Arc<dyn ReadStrategy>,
        override_strategy: Arc<dyn OverrideStrategy>,
    ) -> Self {
        Self {
            name: None,
            delay: Duration::ZERO,
            read_strategy,
            override_strategy,
        }
    }

    /// Mock requests equal to `request`.
    pub fn for_request(request: NetworkRequest, read_strategy: Arc<dyn ReadStrategy>) -> Self {
        Self::new(
            read_strategy,
            Arc::new(CompareOverrideStrategy::new(request)),
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Mock for SingleMock {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn current_read_strategy(&self) -> Arc<dyn ReadStrategy> {
        self.read_strategy.clone()
    }

    fn override_strategy(&self) -> &dyn OverrideStrategy {
        self.override_strategy.as_ref()
    }
}

impl fmt::Debug for SingleMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleMock")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Gives different responses to the same request.
///
/// The first matched request is answered by the first strategy, the second
/// by the second, and so on; after the last strategy it starts over.
pub struct RotatingMock {
    name: Option<String>,
    delay: Duration,
    read_strategies: Vec<Arc<dyn ReadStrategy>>,
    override_strategy: Arc<dyn OverrideStrategy>,
    /// Index of the strategy handed out next
    cursor: Mutex<usize>,
}

impl RotatingMock {
    /// # Panics
    ///
    /// Panics if `read_strategies` is empty.
    pub fn new(
        read_strategies: Vec<Arc<dyn ReadStrategy>>,
        override_strategy: Arc<dyn OverrideStrategy>,
    ) -> Self {
        assert!(
            !read_strategies.is_empty(),
            "RotatingMock read strategies can't be empty"
        );

        Self {
            name: None,
            delay: Duration::ZERO,
            read_strategies,
            override_strategy,
            cursor: Mutex::new(0),
        }
    }

    /// Mock requests equal to `request`.
    ///
    /// # Panics
    ///
    /// Panics if `read_strategies` is empty.
    pub fn for_request(
        request: NetworkRequest,
        read_strategies: Vec<Arc<dyn ReadStrategy>>,
    ) -> Self {
        Self::new(
            read_strategies,
            Arc::new(CompareOverrideStrategy::new(request)),
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of strategies in the rotation.
    pub fn strategy_count(&self) -> usize {
        self.read_strategies.len()
    }

    /// Return the strategy under the cursor and advance it.
    fn next_strategy(&self) -> Arc<dyn ReadStrategy> {
        // The cursor is always a valid index, so a poisoned lock is still usable
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let strategy = self.read_strategies[*cursor].clone();
        *cursor = (*cursor + 1) % self.read_strategies.len();
        strategy
    }
}

impl Mock for RotatingMock {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn current_read_strategy(&self) -> Arc<dyn ReadStrategy> {
        self.next_strategy()
    }

    fn override_strategy(&self) -> &dyn OverrideStrategy {
        self.override_strategy.as_ref()
    }
}

impl fmt::Debug for RotatingMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingMock")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .field("strategies", &self.read_strategies.len())
            .finish_non_exhaustive()
    }
}
