//! Tracking of running effects.

use std::sync::Arc;
use tokio::sync::watch;

/// Waits for the effects spawned by one [`Store::send`](crate::Store::send).
///
/// Completion includes reducing the actions those effects produced, but not
/// the effects that reduction started in turn.
///
/// ```ignore
/// let mut handle = store.send(ListAction::Mounted).await?;
/// handle.wait().await;
/// ```
#[derive(Clone, Debug)]
pub struct EffectHandle {
    running: watch::Receiver<usize>,
}

impl EffectHandle {
    pub(crate) fn new() -> (Self, EffectCounter) {
        let (sender, running) = watch::channel(0);
        (Self { running }, EffectCounter(Arc::new(sender)))
    }

    /// Wait until every tracked effect has finished
    pub async fn wait(&mut self) {
        if self.running.wait_for(|running| *running == 0).await.is_err() {
            tracing::trace!("Effect counter dropped");
        }
    }
}

/// Number of running effects, observable through a watch channel
#[derive(Clone)]
pub(crate) struct EffectCounter(Arc<watch::Sender<usize>>);

impl EffectCounter {
    /// Counter nobody is waiting on yet
    pub(crate) fn idle() -> Self {
        Self(Arc::new(watch::channel(0).0))
    }

    /// Count one effect as running until the returned guard drops
    pub(crate) fn start(&self) -> RunningEffect {
        self.0.send_modify(|running| *running += 1);
        RunningEffect(self.clone())
    }

    pub(crate) fn current(&self) -> usize {
        *self.0.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<usize> {
        self.0.subscribe()
    }
}

/// Decrements its counter on drop, so a panicking effect is still counted out
pub(crate) struct RunningEffect(EffectCounter);

impl Drop for RunningEffect {
    fn drop(&mut self) {
        self.0.0.send_modify(|running| *running = running.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_once_every_effect_is_done() {
        let (mut handle, counter) = EffectHandle::new();
        let first = counter.start();
        let second = counter.start();
        assert_eq!(counter.current(), 2);

        let waiter = tokio::spawn(async move { handle.wait().await });
        drop(first);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(second);
        assert!(tokio::time::timeout(Duration::from_secs(1), waiter).await.is_ok());
    }

    #[tokio::test]
    async fn handle_without_effects_is_already_done() {
        let (mut handle, counter) = EffectHandle::new();
        drop(counter);
        let waited = tokio::time::timeout(Duration::from_millis(50), handle.wait()).await;
        assert!(waited.is_ok());
    }
}
