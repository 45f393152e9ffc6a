//! Async content slots
//!
//! A [`ContentSlot`] owns one [`ContentStateMachine`] and drives it from
//! asynchronous fetches. The lock is never held across an await: the fetch is
//! started and resolved under the lock, awaited outside it.
//!
//! Lock order is `in_flight` then `machine`. Every operation that issues a
//! request holds `in_flight` until its ticket is issued and any task is
//! registered, so the newest ticket always belongs to the registered task.

use crate::error::{FetchError, StateMachineError};
use crate::machine::{ContentStateMachine, StateSnapshot, TransitionRecord, DEFAULT_HISTORY_LIMIT};
use crate::request::{ContentRequest, RequestTicket};
use crate::source::ContentSource;
use crate::state::ContentState;
use parking_lot::{Mutex, MutexGuard};
use scr_sanitizer::SanitizationPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use ulid::Ulid;

/// Unique slot identifier, used to tell slots apart in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub Ulid);

impl SlotId {
    /// Generate new slot ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Fetches slower than this fail with [`FetchError::Timeout`]
    pub fetch_timeout_ms: Option<u64>,
    /// Transition records kept per slot
    pub history_limit: usize,
}

impl SlotConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With fetch timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// With history limit
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Fetch timeout as a duration
    #[inline]
    #[must_use]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Shared handle to one slot of displayed content
///
/// Cloning is cheap and every clone drives the same state machine.
#[derive(Debug, Clone)]
pub struct ContentSlot {
    id: SlotId,
    config: SlotConfig,
    machine: Arc<Mutex<ContentStateMachine>>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
}

impl ContentSlot {
    /// Create an idle slot with default configuration
    #[must_use]
    pub fn new(policy: Arc<SanitizationPolicy>) -> Self {
        Self::with_config(policy, SlotConfig::default())
    }

    /// Create an idle slot
    #[must_use]
    pub fn with_config(policy: Arc<SanitizationPolicy>, config: SlotConfig) -> Self {
        let machine = ContentStateMachine::new(policy).with_history_limit(config.history_limit);
        Self {
            id: SlotId::new(),
            config,
            machine: Arc::new(Mutex::new(machine)),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Slot identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Slot configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ContentState {
        self.machine.lock().state().clone()
    }

    /// Current state with its transition identity
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.machine.lock().snapshot()
    }

    /// Recent transitions, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<TransitionRecord> {
        self.machine.lock().history().copied().collect()
    }

    /// Submit content synchronously, superseding any fetch in flight
    ///
    /// # Errors
    /// See [`ContentStateMachine::submit`].
    pub fn submit(&self, request: ContentRequest) -> Result<StateSnapshot, StateMachineError> {
        let _in_flight = self.cancel_in_flight();
        let mut machine = self.machine.lock();
        machine.submit(request)?;
        Ok(machine.snapshot())
    }

    /// Return to `Idle`, cancelling any spawned fetch
    pub fn reset(&self) {
        let _in_flight = self.cancel_in_flight();
        self.machine.lock().reset();
    }

    /// Fetch `source_id` from `source` and apply the result
    ///
    /// The slot enters `Loading` before the first await. If another request
    /// is issued on this slot while the fetch is pending, the fetched result
    /// is discarded and [`StateMachineError::StaleResult`] is returned.
    ///
    /// # Errors
    /// Returns [`StateMachineError::StaleResult`] when superseded.
    #[tracing::instrument(skip(self, source), fields(slot = %self.id))]
    pub async fn load<S>(&self, source: &S, source_id: &str) -> Result<StateSnapshot, StateMachineError>
    where
        S: ContentSource + ?Sized,
    {
        let ticket = {
            let _in_flight = self.cancel_in_flight();
            self.machine.lock().begin_fetch(source_id)?
        };
        self.fetch_and_resolve(source, ticket).await
    }

    /// Like [`Self::load`], on a tokio task
    ///
    /// The previously spawned fetch of this slot, if still running, is
    /// aborted. The slot enters `Loading` before this returns.
    ///
    /// # Errors
    /// Returns an error only if the slot cannot enter `Loading`.
    pub fn spawn_load<S>(
        &self,
        source: Arc<S>,
        source_id: impl Into<String>,
    ) -> Result<JoinHandle<Result<StateSnapshot, StateMachineError>>, StateMachineError>
    where
        S: ContentSource + ?Sized + 'static,
    {
        let mut in_flight = self.in_flight.lock();
        let ticket = self.machine.lock().begin_fetch(source_id)?;
        let slot = self.clone();
        let handle = tokio::spawn(async move { slot.fetch_and_resolve(source.as_ref(), ticket).await });

        if let Some(previous) = in_flight.replace(handle.abort_handle()) {
            previous.abort();
        }
        Ok(handle)
    }

    async fn fetch_and_resolve<S>(
        &self,
        source: &S,
        ticket: RequestTicket,
    ) -> Result<StateSnapshot, StateMachineError>
    where
        S: ContentSource + ?Sized,
    {
        let outcome = match self.config.fetch_timeout() {
            Some(limit) => tokio::time::timeout(limit, source.fetch(ticket.source_id()))
                .await
                .unwrap_or_else(|_| {
                    Err(FetchError::Timeout {
                        source_id: ticket.source_id().to_string(),
                        millis: self.config.fetch_timeout_ms.unwrap_or_default(),
                    })
                }),
            None => source.fetch(ticket.source_id()).await,
        };

        let mut machine = self.machine.lock();
        machine.resolve(&ticket, outcome)?;
        Ok(machine.snapshot())
    }

    /// Abort the spawned fetch, returning the held `in_flight` lock
    fn cancel_in_flight(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        let mut in_flight = self.in_flight.lock();
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
        in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockContentSource;
    use crate::state::{ErrorReason, StateKind};
    use async_trait::async_trait;

    fn slot(tags: &[&str]) -> ContentSlot {
        let policy = SanitizationPolicy::builder().allow_tags(tags).build().unwrap();
        ContentSlot::new(Arc::new(policy))
    }

    struct SlowSource(Duration);

    #[async_trait]
    impl ContentSource for SlowSource {
        async fn fetch(&self, source_id: &str) -> Result<String, FetchError> {
            tokio::time::sleep(self.0).await;
            Ok(source_id.to_string())
        }
    }

    #[tokio::test]
    async fn load_sanitizes_fetched_content() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|id| Ok(format!("<b onclick=\"x()\">{id}</b>")));

        let slot = slot(&["b"]);
        let snapshot = slot.load(&source, "post-1").await.unwrap();

        assert_eq!(snapshot.state.safe_content().unwrap(), "<b>post-1</b>");
        assert_eq!(snapshot.transition, 2);
    }

    #[tokio::test]
    async fn load_failure_becomes_error_state() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch()
            .returning(|id| Err(FetchError::unavailable(id, "connection reset")));

        let slot = slot(&["b"]);
        let snapshot = slot.load(&source, "post-1").await.unwrap();

        assert_eq!(
            snapshot.state,
            ContentState::Error {
                reason: ErrorReason::SourceFetchFailed
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let policy = Arc::new(SanitizationPolicy::empty());
        let config = SlotConfig::new().with_fetch_timeout(Duration::from_millis(50));
        let slot = ContentSlot::with_config(policy, config);

        let snapshot = slot
            .load(&SlowSource(Duration::from_secs(5)), "post")
            .await
            .unwrap();
        assert_eq!(snapshot.state.error_reason(), Some(ErrorReason::SourceFetchFailed));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_supersedes_pending_load() {
        let slot = slot(&[]);
        let source = SlowSource(Duration::from_millis(100));

        let pending = slot.load(&source, "remote");
        let submit = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            slot.submit(ContentRequest::new("prop", "local")).unwrap()
        };
        let (loaded, _) = tokio::join!(pending, submit);

        assert!(loaded.unwrap_err().is_stale());
        assert_eq!(slot.state().safe_content().unwrap(), "local");
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_load_aborts_previous_task() {
        let slot = slot(&[]);
        let slow = Arc::new(SlowSource(Duration::from_millis(100)));

        let first = slot.spawn_load(slow.clone(), "first").unwrap();
        let second = slot.spawn_load(slow, "second").unwrap();

        assert!(first.await.unwrap_err().is_cancelled());
        let snapshot = second.await.unwrap().unwrap();
        assert_eq!(snapshot.state.safe_content().unwrap(), "second");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_spawned_load() {
        let slot = slot(&[]);
        let handle = slot
            .spawn_load(Arc::new(SlowSource(Duration::from_millis(100))), "post")
            .unwrap();
        assert_eq!(slot.state().kind(), StateKind::Loading);

        slot.reset();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(slot.state(), ContentState::Idle);
    }

    #[test]
    fn slot_ids_are_unique() {
        assert_ne!(slot(&[]).id(), slot(&[]).id());
    }

    #[test]
    fn config_timeout_roundtrip() {
        let config = SlotConfig::new().with_fetch_timeout(Duration::from_millis(250));
        assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(SlotConfig::default().fetch_timeout(), None);
    }
}
