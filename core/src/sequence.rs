//! Opt-in guard against stale responses.
//!
//! Calls are not cancelled and may finish out of order. A caller that only
//! cares about its latest request wraps each call in `Sequencer::run`; a
//! result whose ticket has been superseded comes back as `None`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Sequencer {
    latest: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new call, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// The ticket is taken here, when the call is issued, not at first poll.
    pub fn run<'a, F>(&'a self, fut: F) -> impl Future<Output = Option<F::Output>> + 'a
    where
        F: Future + 'a,
    {
        let ticket = self.begin();
        async move {
            let output = fut.await;
            self.is_current(ticket).then_some(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn newer_tickets_supersede_older_ones() {
        let seq = Sequencer::new();
        let first = seq.begin();
        assert!(seq.is_current(first));
        let second = seq.begin();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second > first);
    }

    #[tokio::test]
    async fn slow_stale_call_is_discarded() {
        let seq = Sequencer::new();
        let (slow_tx, slow_rx) = oneshot::channel::<&str>();

        let slow = seq.run(async { slow_rx.await.unwrap() });
        let fresh = seq.run(async { "fresh" });

        // Poll in the order the calls were issued; the fresh one finishes first.
        let (stale, fresh) = tokio::join!(
            slow,
            async {
                let out = fresh.await;
                slow_tx.send("stale").unwrap();
                out
            }
        );
        assert_eq!(fresh, Some("fresh"));
        assert_eq!(stale, None);
    }

    #[tokio::test]
    async fn tickets_follow_issue_order_not_poll_order() {
        let seq = Sequencer::new();
        let older = seq.run(async { "older" });
        let newer = seq.run(async { "newer" });

        assert_eq!(newer.await, Some("newer"));
        assert_eq!(older.await, None);
    }
}
