//! The [`Store`]: state, reducer and environment behind one handle.

use crate::error::StoreError;
use crate::handle::{EffectCounter, EffectHandle};
use crate::metrics::{EffectMetrics, ReducerMetrics, StoreMetrics};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tasklist_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the channel carrying effect-produced actions to waiters
const ACTION_CHANNEL_CAPACITY: usize = 64;

/// Runtime coordinator for a reducer.
///
/// Actions are reduced one at a time under a write lock. Each returned
/// [`Effect::Future`] runs on its own task; the action it resolves to is
/// broadcast to waiters and then sent back through the reducer.
///
/// Clones share the same state.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    closed: Arc<AtomicBool>,
    running: EffectCounter,
    results: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        let (results, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            closed: Arc::new(AtomicBool::new(false)),
            running: EffectCounter::idle(),
            results,
        }
    }

    /// Reduce `action` and start the effects it returns.
    ///
    /// Returns once the state is updated; the handle waits for the effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Store::shutdown`].
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            StoreMetrics::record_rejected();
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.state.write().await;
            let started = Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            ReducerMetrics::record_action(started.elapsed());
            effects
        };

        let (handle, counter) = EffectHandle::new();
        for effect in effects {
            match effect {
                Effect::None => {},
                Effect::Future(future) => self.spawn_effect(&counter, future),
            }
        }

        Ok(handle)
    }

    /// Send an action, then wait for the first effect-produced action
    /// matching `predicate`.
    ///
    /// The match is returned as soon as it is broadcast, possibly before the
    /// reducer has processed it.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action before `timeout`
    /// - [`StoreError::ChannelClosed`]: action broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: store is shutting down
    pub async fn send_and_wait_for<F>(&self, action: A, predicate: F, timeout: Duration) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut results = self.results.subscribe();
        self.send(action).await?;

        let matching = async {
            loop {
                match results.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action waiter lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => return Err(StoreError::ChannelClosed),
                }
            }
        };

        tokio::time::timeout(timeout, matching)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Read current state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&*self.state.read().await)
    }

    /// Stop accepting actions and wait for running effects to finish.
    ///
    /// Actions that running effects produce after this point are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
    /// still running when `timeout` expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Store shutting down");
        self.closed.store(true, Ordering::Release);

        let mut running = self.running.subscribe();
        let drained = tokio::time::timeout(timeout, running.wait_for(|count| *count == 0))
            .await
            .is_ok();

        if drained {
            tracing::info!("All effects completed");
            StoreMetrics::record_shutdown("completed");
            Ok(())
        } else {
            let pending = self.running.current();
            tracing::error!(pending_effects = pending, "Shutdown timed out");
            StoreMetrics::record_shutdown("timeout");
            Err(StoreError::ShutdownTimeout(pending))
        }
    }

    /// Run one effect on its own task, counted by both the handle and the store
    fn spawn_effect(&self, counter: &EffectCounter, future: Pin<Box<dyn Future<Output = Option<A>> + Send>>) {
        EffectMetrics::record_spawned();
        let running = (counter.start(), self.running.start());
        let store = self.clone();

        tokio::spawn(async move {
            let _running = running;
            if let Some(action) = future.await {
                store.feed_back(action).await;
            }
        });
    }

    async fn feed_back(&self, action: A) {
        if self.results.send(action.clone()).is_err() {
            tracing::trace!("No action waiters");
        }
        if let Err(error) = self.send(action).await {
            tracing::debug!(%error, "Dropped action produced by effect");
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            closed: Arc::clone(&self.closed),
            running: self.running.clone(),
            results: self.results.clone(),
        }
    }
}
