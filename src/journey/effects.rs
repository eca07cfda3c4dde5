//! Delayed display effects armed on every stage change.
//!
//! Each effect is a tokio task that sleeps for its delay and then posts an
//! [`Effect`] back to the owner. Re-arming aborts the previous tasks and
//! bumps the epoch; anything tagged with an older epoch is discarded when
//! drained, so an effect already sitting in the channel can't fire for a
//! stage the viewer has left.

use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Default pause before the chat bubble re-enters
pub const REVEAL_DELAY: Duration = Duration::from_millis(300);

/// Default time confetti stays mounted after a change
pub const CONFETTI_WINDOW: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    RevealMessage,
    ClearConfetti,
}

#[derive(Debug, Clone, Copy)]
struct Effect {
    epoch: u64,
    kind: EffectKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub reveal_delay: Duration,
    pub confetti_window: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reveal_delay: REVEAL_DELAY,
            confetti_window: CONFETTI_WINDOW,
        }
    }
}

pub struct EffectScheduler {
    timings: Timings,
    tx: UnboundedSender<Effect>,
    rx: UnboundedReceiver<Effect>,
    epoch: u64,
    pending: Vec<JoinHandle<()>>,
}

impl EffectScheduler {
    pub fn new(timings: Timings) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            timings,
            tx,
            rx,
            epoch: 0,
            pending: Vec::with_capacity(2),
        }
    }

    /// Cancel whatever is outstanding and schedule a fresh reveal + clear pair.
    /// Must be called from within a tokio runtime.
    pub fn rearm(&mut self) {
        self.cancel();
        self.epoch += 1;

        let reveal = self.spawn(EffectKind::RevealMessage, self.timings.reveal_delay);
        let clear = self.spawn(EffectKind::ClearConfetti, self.timings.confetti_window);
        self.pending.push(reveal);
        self.pending.push(clear);

        tracing::trace!(epoch = self.epoch, "effects armed");
    }

    /// Abort outstanding effects. Anything already queued is invalidated too.
    pub fn cancel(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
        self.epoch += 1;
    }

    /// Effects that fired for the current epoch since the last call
    pub fn drain_due(&mut self) -> Vec<EffectKind> {
        let mut due = Vec::new();
        while let Ok(effect) = self.rx.try_recv() {
            if effect.epoch == self.epoch {
                due.push(effect.kind);
            } else {
                tracing::trace!(
                    stale = effect.epoch,
                    current = self.epoch,
                    kind = ?effect.kind,
                    "dropping stale effect"
                );
            }
        }
        due
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    fn spawn(&self, kind: EffectKind, delay: Duration) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver is gone once the owner is dropped
            let _ = tx.send(Effect { epoch, kind });
        })
    }
}

impl Drop for EffectScheduler {
    fn drop(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn scheduler() -> EffectScheduler {
        EffectScheduler::new(Timings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_effects_fire_in_order() {
        let mut s = scheduler();
        s.rearm();
        assert!(s.drain_due().is_empty());

        sleep(Duration::from_millis(310)).await;
        assert_eq!(s.drain_due(), vec![EffectKind::RevealMessage]);

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(s.drain_due(), vec![EffectKind::ClearConfetti]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_supersedes_previous() {
        let mut s = scheduler();
        s.rearm();
        sleep(Duration::from_millis(200)).await;
        s.rearm();

        // First reveal would have been due at 300ms
        sleep(Duration::from_millis(150)).await;
        assert!(s.drain_due().is_empty());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(s.drain_due(), vec![EffectKind::RevealMessage]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_effect_is_dropped_after_cancel() {
        let mut s = scheduler();
        s.rearm();
        sleep(Duration::from_millis(310)).await;

        // Reveal is already in the channel but nobody drained it yet
        s.cancel();
        assert!(s.drain_due().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_everything() {
        let mut s = scheduler();
        s.rearm();
        s.cancel();
        sleep(Duration::from_secs(5)).await;
        assert!(s.drain_due().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_armed_effects() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let before = metrics.num_alive_tasks();

        let mut s = scheduler();
        s.rearm();
        assert_eq!(metrics.num_alive_tasks(), before + 2);

        drop(s);
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(metrics.num_alive_tasks(), before);
    }
}
