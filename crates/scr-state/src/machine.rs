//! Content state machine
//!
//! One [`ContentStateMachine`] tracks one slot of displayed content through
//! `Idle -> Loading -> {Ready, Error}`.
//!
//! # Last request wins
//!
//! Every accepted request gets a fresh [`RequestId`] and becomes the active
//! request. A result is only applied if it carries the active request's
//! ticket and the machine is still `Loading`; anything else is rejected
//! without touching the state.

use crate::error::{FetchError, StateMachineError};
use crate::request::{ContentRequest, RequestId, RequestTicket};
use crate::state::{ContentState, ErrorReason, StateKind};
use crate::transitions::validate_transition;
use scr_sanitizer::{try_sanitize, SanitizationPolicy};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Transitions kept in history by default
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// One applied transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    /// 1-based transition sequence number
    pub seq: u64,
    /// Active request when the transition happened
    pub request: Option<RequestId>,
    /// State before
    pub from: StateKind,
    /// State after
    pub to: StateKind,
}

/// State plus the identity of the transition that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Current state
    pub state: ContentState,
    /// Active request, if any
    pub request: Option<RequestId>,
    /// Sequence number of the last transition (0 before any)
    pub transition: u64,
}

#[derive(Debug, Clone)]
struct ActiveRequest {
    ticket: RequestTicket,
    /// Set for synchronously submitted requests, used to skip unchanged resubmits.
    submitted: Option<ContentRequest>,
}

/// Tracks the content state of a single slot
#[derive(Debug)]
pub struct ContentStateMachine {
    policy: Arc<SanitizationPolicy>,
    state: ContentState,
    active: Option<ActiveRequest>,
    last_request: u64,
    transitions: u64,
    history: VecDeque<TransitionRecord>,
    history_limit: usize,
}

impl ContentStateMachine {
    /// Create an idle machine sanitizing with `policy`
    #[must_use]
    pub fn new(policy: Arc<SanitizationPolicy>) -> Self {
        Self {
            policy,
            state: ContentState::Idle,
            active: None,
            last_request: 0,
            transitions: 0,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep at most `limit` transition records (0 disables history)
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        while self.history.len() > limit {
            self.history.pop_front();
        }
        self
    }

    /// Policy used for every sanitize call
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &Arc<SanitizationPolicy> {
        &self.policy
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ContentState {
        &self.state
    }

    /// Active request id, if any
    #[inline]
    #[must_use]
    pub fn active_request(&self) -> Option<RequestId> {
        self.active.as_ref().map(|a| a.ticket.id())
    }

    /// Number of transitions applied so far
    #[inline]
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    /// Recent transitions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> + '_ {
        self.history.iter()
    }

    /// Copy of the state with its transition identity
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.state.clone(),
            request: self.active_request(),
            transition: self.transitions,
        }
    }

    /// True if `ticket` belongs to the active request
    #[inline]
    #[must_use]
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.active_request() == Some(ticket.id())
    }

    /// Start an asynchronous fetch: the machine moves to `Loading`
    ///
    /// Any in-flight request is superseded; its result will be rejected.
    ///
    /// # Errors
    /// Returns [`StateMachineError::IllegalTransition`] only if the transition
    /// table forbids entering `Loading`.
    pub fn begin_fetch(
        &mut self,
        source_id: impl Into<String>,
    ) -> Result<RequestTicket, StateMachineError> {
        let ticket = self.issue(source_id.into(), None);
        self.transition(ContentState::Loading)?;
        Ok(ticket)
    }

    /// Submit content synchronously
    ///
    /// Content goes through `Loading` to `Ready` or `Error` before this
    /// returns. A request without content goes straight to
    /// `Error { EmptyInput }`. Resubmitting the request that is already
    /// settled is a no-op returning the active ticket.
    ///
    /// # Errors
    /// Returns [`StateMachineError::IllegalTransition`] only if the transition
    /// table forbids the required transitions.
    pub fn submit(&mut self, request: ContentRequest) -> Result<RequestTicket, StateMachineError> {
        if let Some(active) = &self.active {
            if self.state.is_settled() && active.submitted.as_ref() == Some(&request) {
                tracing::trace!(request = %active.ticket.id(), "request unchanged, keeping state");
                return Ok(active.ticket.clone());
            }
        }

        let raw_content = request.raw_content.clone();
        let ticket = self.issue(request.source_id.clone(), Some(request));

        match raw_content {
            None => {
                tracing::warn!(
                    request = %ticket.id(),
                    source_id = ticket.source_id(),
                    "content request has no content"
                );
                self.transition(ContentState::Error {
                    reason: ErrorReason::EmptyInput,
                })?;
            }
            Some(raw) => {
                self.transition(ContentState::Loading)?;
                self.settle(&ticket, &raw)?;
            }
        }

        Ok(ticket)
    }

    /// Apply the outcome of a fetch started with [`Self::begin_fetch`]
    ///
    /// # Errors
    /// Returns [`StateMachineError::StaleResult`] if the ticket was superseded
    /// or the machine was reset, and [`StateMachineError::AlreadyResolved`] if
    /// the request already settled. The state is unchanged in both cases.
    pub fn resolve(
        &mut self,
        ticket: &RequestTicket,
        outcome: Result<String, FetchError>,
    ) -> Result<&ContentState, StateMachineError> {
        self.check_current(ticket)?;

        match outcome {
            Ok(raw) => self.settle(ticket, &raw)?,
            Err(err) => {
                tracing::warn!(
                    request = %ticket.id(),
                    source_id = ticket.source_id(),
                    error = %err,
                    "content fetch failed"
                );
                self.transition(ContentState::Error {
                    reason: ErrorReason::SourceFetchFailed,
                })?;
            }
        }

        Ok(&self.state)
    }

    /// Return to `Idle`, invalidating every outstanding ticket
    pub fn reset(&mut self) {
        self.active = None;
        // Any -> Idle is always legal.
        self.record(ContentState::Idle);
    }

    fn issue(&mut self, source_id: String, submitted: Option<ContentRequest>) -> RequestTicket {
        self.last_request += 1;
        let ticket = RequestTicket::new(RequestId::new(self.last_request), source_id);

        let previous = self.active.replace(ActiveRequest {
            ticket: ticket.clone(),
            submitted,
        });
        if let Some(previous) = previous {
            if self.state.kind() == StateKind::Loading {
                tracing::debug!(
                    superseded = %previous.ticket.id(),
                    by = %ticket.id(),
                    "in-flight request superseded"
                );
            }
        }

        ticket
    }

    fn check_current(&self, ticket: &RequestTicket) -> Result<(), StateMachineError> {
        let current = self.active_request();
        if current != Some(ticket.id()) {
            tracing::debug!(stale = %ticket.id(), ?current, "discarding stale result");
            return Err(StateMachineError::StaleResult {
                stale: ticket.id(),
                current,
            });
        }
        if self.state.kind() != StateKind::Loading {
            return Err(StateMachineError::AlreadyResolved(ticket.id()));
        }
        Ok(())
    }

    fn settle(&mut self, ticket: &RequestTicket, raw: &str) -> Result<(), StateMachineError> {
        let next = match try_sanitize(raw, &self.policy) {
            Ok(safe_content) => ContentState::Ready { safe_content },
            Err(err) => {
                tracing::warn!(
                    request = %ticket.id(),
                    source_id = ticket.source_id(),
                    error = %err,
                    "content sanitization failed"
                );
                ContentState::Error {
                    reason: ErrorReason::SanitizationFailed,
                }
            }
        };
        self.transition(next)
    }

    fn transition(&mut self, next: ContentState) -> Result<(), StateMachineError> {
        validate_transition(self.state.kind(), next.kind())?;
        self.record(next);
        Ok(())
    }

    fn record(&mut self, next: ContentState) {
        self.transitions += 1;
        let record = TransitionRecord {
            seq: self.transitions,
            request: self.active_request(),
            from: self.state.kind(),
            to: next.kind(),
        };
        tracing::debug!(
            seq = record.seq,
            request = ?record.request,
            from = %record.from,
            to = %record.to,
            "content state transition"
        );

        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(record);
        }
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StateKind::{Error, Idle, Loading, Ready};

    fn machine(tags: &[&str]) -> ContentStateMachine {
        let policy = SanitizationPolicy::builder().allow_tags(tags).build().unwrap();
        ContentStateMachine::new(Arc::new(policy))
    }

    fn path(machine: &ContentStateMachine) -> Vec<(StateKind, StateKind)> {
        machine.history().map(|r| (r.from, r.to)).collect()
    }

    #[test]
    fn starts_idle() {
        let m = machine(&[]);
        assert_eq!(m.state(), &ContentState::Idle);
        assert_eq!(m.active_request(), None);
        assert_eq!(m.snapshot().transition, 0);
    }

    #[test]
    fn fetch_then_ready() {
        let mut m = machine(&["b"]);
        let ticket = m.begin_fetch("post").unwrap();
        assert_eq!(m.state().kind(), Loading);

        let state = m.resolve(&ticket, Ok("<b>hi</b><i>!</i>".into())).unwrap();
        assert_eq!(state.safe_content().unwrap(), "<b>hi</b>!");
        assert_eq!(path(&m), vec![(Idle, Loading), (Loading, Ready)]);
    }

    #[test]
    fn fetch_failure_is_error() {
        let mut m = machine(&["b"]);
        let ticket = m.begin_fetch("post").unwrap();
        m.resolve(&ticket, Err(FetchError::NotFound("post".into())))
            .unwrap();

        assert_eq!(m.state().error_reason(), Some(ErrorReason::SourceFetchFailed));
        assert_eq!(path(&m), vec![(Idle, Loading), (Loading, Error)]);
    }

    #[test]
    fn sanitizer_failure_is_error() {
        let policy = SanitizationPolicy::builder()
            .allow_tag("p")
            .max_input_len(4)
            .build()
            .unwrap();
        let mut m = ContentStateMachine::new(Arc::new(policy));

        m.submit(ContentRequest::new("post", "<p>too long</p>")).unwrap();
        assert_eq!(m.state().error_reason(), Some(ErrorReason::SanitizationFailed));
        assert_eq!(path(&m), vec![(Idle, Loading), (Loading, Error)]);
    }

    #[test]
    fn missing_content_is_empty_input() {
        let mut m = machine(&["p"]);
        m.submit(ContentRequest::missing("post")).unwrap();
        assert_eq!(m.state().error_reason(), Some(ErrorReason::EmptyInput));
        assert_eq!(path(&m), vec![(Idle, Error)]);
    }

    #[test]
    fn sanitized_to_nothing_is_ready() {
        let mut m = machine(&[]);
        m.submit(ContentRequest::new("post", "<script>x</script>")).unwrap();
        assert_eq!(m.state().safe_content().unwrap(), "");
    }

    #[test]
    fn rerequest_after_ready() {
        let mut m = machine(&["p"]);
        m.submit(ContentRequest::new("post", "<p>one</p>")).unwrap();
        m.submit(ContentRequest::new("post", "<p>two</p>")).unwrap();

        assert_eq!(m.state().safe_content().unwrap(), "<p>two</p>");
        assert_eq!(
            path(&m),
            vec![(Idle, Loading), (Loading, Ready), (Ready, Loading), (Loading, Ready)]
        );
    }

    #[test]
    fn unchanged_resubmit_is_noop() {
        let mut m = machine(&["p"]);
        let first = m.submit(ContentRequest::new("post", "<p>one</p>")).unwrap();
        let again = m.submit(ContentRequest::new("post", "<p>one</p>")).unwrap();

        assert_eq!(first, again);
        assert_eq!(m.transition_count(), 2);
    }

    #[test]
    fn stale_fetch_result_is_discarded() {
        let mut m = machine(&[]);
        let a = m.begin_fetch("a").unwrap();
        let b = m.begin_fetch("b").unwrap();

        let err = m.resolve(&a, Ok("foo".into())).unwrap_err();
        assert_eq!(
            err,
            StateMachineError::StaleResult {
                stale: a.id(),
                current: Some(b.id())
            }
        );
        assert_eq!(m.state().kind(), Loading);

        m.resolve(&b, Ok("bar".into())).unwrap();
        assert!(m.resolve(&a, Err(FetchError::NotFound("a".into()))).is_err());
        assert_eq!(m.state().safe_content().unwrap(), "bar");
    }

    #[test]
    fn stale_fetch_cannot_override_submitted_content() {
        let mut m = machine(&[]);
        let fetch = m.begin_fetch("remote").unwrap();
        m.submit(ContentRequest::new("prop", "local")).unwrap();

        assert!(m.resolve(&fetch, Ok("remote".into())).unwrap_err().is_stale());
        assert_eq!(m.state().safe_content().unwrap(), "local");
    }

    #[test]
    fn double_resolve_is_rejected() {
        let mut m = machine(&[]);
        let ticket = m.begin_fetch("a").unwrap();
        m.resolve(&ticket, Ok("x".into())).unwrap();

        assert_eq!(
            m.resolve(&ticket, Ok("y".into())).unwrap_err(),
            StateMachineError::AlreadyResolved(ticket.id())
        );
        assert_eq!(m.state().safe_content().unwrap(), "x");
    }

    #[test]
    fn reset_invalidates_tickets() {
        let mut m = machine(&[]);
        let ticket = m.begin_fetch("a").unwrap();
        m.reset();

        assert_eq!(m.state(), &ContentState::Idle);
        assert!(!m.is_current(&ticket));
        assert!(m.resolve(&ticket, Ok("x".into())).unwrap_err().is_stale());
        assert_eq!(m.state(), &ContentState::Idle);
    }

    #[test]
    fn history_is_bounded() {
        let mut m = machine(&[]).with_history_limit(3);
        for i in 0..5 {
            m.submit(ContentRequest::new("post", format!("v{i}"))).unwrap();
        }

        let seqs: Vec<u64> = m.history().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![8, 9, 10]);
        assert_eq!(m.transition_count(), 10);
    }

    #[test]
    fn snapshot_tracks_transition_identity() {
        let mut m = machine(&[]);
        let ticket = m.begin_fetch("a").unwrap();
        let loading = m.snapshot();
        assert_eq!(loading.request, Some(ticket.id()));
        assert_eq!(loading.transition, 1);

        m.resolve(&ticket, Ok("x".into())).unwrap();
        assert_eq!(m.snapshot().transition, 2);
    }
}
