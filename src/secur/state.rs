//! Process-wide session state shared with the host UI (the `secur` slice).
//!
//! A cloneable handle over a `watch` channel: synchronous reads through
//! [`SessionState::snapshot`], reactive reads through
//! [`SessionState::subscribe`]. Each navigation cycle takes a sequence number
//! here; only the latest cycle may apply asynchronous results.

use super::member::Member;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Name under which the host exposes the state.
pub const STATE_MODULE: &str = "secur";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecurSnapshot {
    pub member: Option<Member>,
    pub ready: bool,
}

/// Identifies one navigation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cycle(u64);

impl Cycle {
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct SessionState {
    sender: Arc<watch::Sender<SecurSnapshot>>,
    sequence: Arc<AtomicU64>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Empty, not-ready state.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SecurSnapshot::default());
        Self {
            sender: Arc::new(sender),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SecurSnapshot {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn member(&self) -> Option<Member> {
        self.sender.borrow().member.clone()
    }

    #[must_use]
    pub fn has_member(&self) -> bool {
        self.sender.borrow().member.is_some()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.sender.borrow().ready
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SecurSnapshot> {
        self.sender.subscribe()
    }

    pub fn set_member(&self, member: Option<Member>) {
        self.sender.send_if_modified(|state| {
            if state.member == member {
                return false;
            }
            state.member = member;
            true
        });
    }

    pub fn set_ready(&self, ready: bool) {
        self.sender.send_if_modified(|state| {
            let changed = state.ready != ready;
            state.ready = ready;
            changed
        });
    }

    /// Back to empty and not ready, as after logout.
    pub fn reset(&self) {
        self.sender.send_if_modified(|state| {
            let changed = state.member.is_some() || state.ready;
            *state = SecurSnapshot::default();
            changed
        });
    }

    /// Starts a navigation cycle, superseding every earlier one.
    pub fn begin_cycle(&self) -> Cycle {
        Cycle(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, cycle: Cycle) -> bool {
        self.sequence.load(Ordering::SeqCst) == cycle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_not_ready() {
        let state = SessionState::new();
        assert_eq!(state.snapshot(), SecurSnapshot::default());
        assert!(!state.is_ready());
        assert!(!state.has_member());
    }

    #[test]
    fn clones_share_the_same_state() {
        let state = SessionState::new();
        let other = state.clone();
        other.set_member(Some(Member::new("u1")));
        other.set_ready(true);
        assert_eq!(state.member(), Some(Member::new("u1")));
        assert!(state.is_ready());
    }

    #[test]
    fn reset_clears_member_and_ready() {
        let state = SessionState::new();
        state.set_member(Some(Member::new("u1")));
        state.set_ready(true);
        state.reset();
        assert_eq!(state.snapshot(), SecurSnapshot::default());
    }

    #[test]
    fn later_cycle_supersedes_earlier() {
        let state = SessionState::new();
        let first = state.begin_cycle();
        assert!(state.is_current(first));
        let second = state.begin_cycle();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
        assert!(second > first);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let state = SessionState::new();
        let mut receiver = state.subscribe();
        state.set_ready(true);
        receiver.changed().await.expect("sender is alive");
        assert!(receiver.borrow_and_update().ready);
    }
}
