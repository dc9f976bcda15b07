//! Single-flight guard around a user-initiated async action.
//!
//! A [`GuardedTrigger`] owns a [`TriggerState`] (the busy flag) and a
//! [`GuardedAction`]. While an invocation is in flight every further
//! invocation is dropped without running the action. The flag is released by
//! [`BusyGuard`]'s `Drop`, so it resets on success, on error, on panic and when
//! the awaiting future is cancelled.

use std::{fmt, future::Future, sync::Arc};

use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::action::GuardedAction;

const TRANSITION_FEED_CAPACITY: usize = 64;

struct Flag {
    busy: watch::Sender<bool>,
    transitions: broadcast::Sender<bool>,
}

/// Busy flag of one interactive control.
///
/// Cloning yields another handle to the same flag, which is how a caller can
/// own the state and hand it to the trigger (see [`GuardedTrigger::with_state`]).
#[derive(Clone)]
pub struct TriggerState {
    flag: Arc<Flag>,
}

impl TriggerState {
    pub fn new() -> Self {
        let (busy, _) = watch::channel(false);
        let (transitions, _) = broadcast::channel(TRANSITION_FEED_CAPACITY);
        Self {
            flag: Arc::new(Flag { busy, transitions }),
        }
    }

    pub fn is_busy(&self) -> bool {
        *self.flag.busy.borrow()
    }

    /// Latest-value view of the flag.
    pub fn subscribe(&self) -> BusySignal {
        BusySignal {
            rx: self.flag.busy.subscribe(),
        }
    }

    /// Every transition from now on, in order.
    pub fn transitions(&self) -> TransitionFeed {
        TransitionFeed {
            rx: self.flag.transitions.subscribe(),
        }
    }

    /// Flips idle to busy. Returns `None` when the flag was already set.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        let transitions = &self.flag.transitions;
        let acquired = self.flag.busy.send_if_modified(|busy| {
            if *busy {
                return false;
            }
            *busy = true;
            // Published under the watch lock so the feed order matches the flag.
            let _ = transitions.send(true);
            true
        });
        acquired.then(|| BusyGuard {
            state: self.clone(),
        })
    }
}

impl Default for TriggerState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerState")
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Holds the busy flag for the lifetime of one invocation.
#[must_use = "the busy flag is released as soon as the guard is dropped"]
pub struct BusyGuard {
    state: TriggerState,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let transitions = &self.state.flag.transitions;
        self.state.flag.busy.send_modify(|busy| {
            *busy = false;
            let _ = transitions.send(false);
        });
    }
}

impl fmt::Debug for BusyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BusyGuard")
    }
}

/// Read side of the busy flag, what a control binds its disabled attribute to.
#[derive(Clone)]
pub struct BusySignal {
    rx: watch::Receiver<bool>,
}

impl BusySignal {
    pub fn is_busy(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits for the flag to change and returns its current value, or `None`
    /// once the owning state has been dropped. Intermediate values may be
    /// skipped; use [`TransitionFeed`] to see every step.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Resolves once the flag reads idle. Returns immediately if it already does.
    pub async fn wait_idle(&mut self) {
        // A closed channel means the state is gone, which is as idle as it gets.
        let _ = self.rx.wait_for(|busy| !*busy).await;
    }
}

/// Ordered record of busy transitions, `true` on acquire and `false` on release.
pub struct TransitionFeed {
    rx: broadcast::Receiver<bool>,
}

impl TransitionFeed {
    /// Next transition, or `None` once the owning state has been dropped and
    /// every buffered transition has been read.
    pub async fn next(&mut self) -> Option<bool> {
        loop {
            match self.rx.recv().await {
                Ok(busy) => return Some(busy),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "transition feed lagged; transitions were lost");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Result of an invocation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation<T> {
    Completed(T),
    /// Another invocation was in flight; the action did not run.
    Dropped,
}

impl<T> Invocation<T> {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Invocation::Dropped)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Invocation::Completed(value) => Some(value),
            Invocation::Dropped => None,
        }
    }
}

pub struct GuardedTrigger<A> {
    label: Arc<str>,
    action: Arc<A>,
    state: TriggerState,
}

impl<A> Clone for GuardedTrigger<A> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            action: Arc::clone(&self.action),
            state: self.state.clone(),
        }
    }
}

impl<A: GuardedAction> GuardedTrigger<A> {
    pub fn new(label: impl Into<Arc<str>>, action: A) -> Self {
        Self::with_state(label, action, TriggerState::new())
    }

    /// Builds a trigger around a busy flag the caller already owns.
    pub fn with_state(label: impl Into<Arc<str>>, action: A, state: TriggerState) -> Self {
        Self {
            label: label.into(),
            action: Arc::new(action),
            state,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn subscribe(&self) -> BusySignal {
        self.state.subscribe()
    }

    pub fn transitions(&self) -> TransitionFeed {
        self.state.transitions()
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// Runs the action unless one is already in flight.
    ///
    /// The flag is taken when `invoke` is called, before the returned future
    /// is polled, so `is_busy()` reads `true` right away. Dropping the future
    /// unpolled releases it again. Errors from the action are returned
    /// unchanged after the flag has been released.
    pub fn invoke(
        &self,
    ) -> impl Future<Output = Result<Invocation<A::Output>, A::Error>> + Send + '_
    where
        A::Error: fmt::Display,
    {
        let guard = self.state.try_acquire();
        match &guard {
            Some(_) => debug!(trigger = %self.label, "guarded action started"),
            None => {
                debug!(trigger = %self.label, "guarded action already in flight; dropping invocation")
            }
        }
        async move {
            let Some(guard) = guard else {
                return Ok(Invocation::Dropped);
            };
            let result = self.action.run().await;
            drop(guard);
            match result {
                Ok(output) => {
                    debug!(trigger = %self.label, "guarded action settled");
                    Ok(Invocation::Completed(output))
                }
                Err(error) => {
                    warn!(trigger = %self.label, %error, "guarded action failed");
                    Err(error)
                }
            }
        }
    }
}

impl<A> GuardedTrigger<A>
where
    A: GuardedAction + 'static,
    A::Output: 'static,
    A::Error: fmt::Display + 'static,
{
    /// Click-handler entry point: takes the flag synchronously, then runs the
    /// action on the tokio runtime. Returns `None` when the invocation was
    /// dropped. Dropping the handle does not cancel the action.
    pub fn fire(&self) -> Option<JoinHandle<Result<A::Output, A::Error>>> {
        let Some(guard) = self.state.try_acquire() else {
            debug!(trigger = %self.label, "guarded action already in flight; dropping click");
            return None;
        };
        debug!(trigger = %self.label, "guarded action fired");
        let action = Arc::clone(&self.action);
        let label = Arc::clone(&self.label);
        Some(tokio::spawn(async move {
            let _guard = guard;
            let result = action.run().await;
            match &result {
                Ok(_) => debug!(trigger = %label, "guarded action settled"),
                Err(error) => warn!(trigger = %label, %error, "guarded action failed"),
            }
            result
        }))
    }
}

#[cfg(test)]
#[path = "tests/trigger_tests.rs"]
mod tests;
