//! Presentation-side bindings: controls whose disabled attribute follows a
//! trigger's busy flag.

use std::{
    convert::Infallible,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    action::GuardedAction,
    trigger::{BusySignal, GuardedTrigger, TransitionFeed},
};

/// Rendered state of a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub label: String,
    pub disabled: bool,
}

impl fmt::Display for ControlView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            write!(f, "[ {} ] (disabled)", self.label)
        } else {
            write!(f, "[ {} ]", self.label)
        }
    }
}

pub type ClickHandle<A> =
    JoinHandle<Result<<A as GuardedAction>::Output, <A as GuardedAction>::Error>>;

pub struct Button<A> {
    label: String,
    disabled: bool,
    trigger: GuardedTrigger<A>,
}

impl<A> Button<A>
where
    A: GuardedAction + 'static,
    A::Output: 'static,
    A::Error: fmt::Display + 'static,
{
    pub fn new(label: impl Into<String>, trigger: GuardedTrigger<A>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            trigger,
        }
    }

    /// Static `disabled` prop, independent of the busy flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled || self.trigger.is_busy()
    }

    pub fn view(&self) -> ControlView {
        ControlView {
            label: self.label.clone(),
            disabled: self.is_disabled(),
        }
    }

    pub fn busy_signal(&self) -> BusySignal {
        self.trigger.subscribe()
    }

    /// Every enabled/disabled flip of this button from now on.
    pub fn transitions(&self) -> TransitionFeed {
        self.trigger.transitions()
    }

    pub fn trigger(&self) -> &GuardedTrigger<A> {
        &self.trigger
    }

    /// A disabled button never dispatches its click.
    pub fn click(&self) -> Option<ClickHandle<A>> {
        if self.is_disabled() {
            debug!(control = %self.label, "click on disabled button ignored");
            return None;
        }
        self.trigger.fire()
    }
}

/// A form with a single submit button; submitting goes through the same guard.
pub struct Form<A> {
    submit: Button<A>,
}

impl<A> Form<A>
where
    A: GuardedAction + 'static,
    A::Output: 'static,
    A::Error: fmt::Display + 'static,
{
    pub fn new(trigger: GuardedTrigger<A>) -> Self {
        Self {
            submit: Button::new("Submit", trigger),
        }
    }

    pub fn submit_button(&self) -> &Button<A> {
        &self.submit
    }

    pub fn submit(&self) -> Option<ClickHandle<A>> {
        self.submit.click()
    }
}

/// Increments a shared count; the synchronous action of the counter page.
#[derive(Clone, Default)]
pub struct Counter {
    count: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> String {
        format!("count is {}", self.count())
    }
}

#[async_trait]
impl GuardedAction for Counter {
    type Output = u64;
    type Error = Infallible;

    async fn run(&self) -> Result<u64, Infallible> {
        Ok(self.count.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
#[path = "tests/controls_tests.rs"]
mod tests;
