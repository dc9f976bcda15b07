//! Client-side core of the guarded action playground.
//!
//! [`GuardedTrigger`] is the piece everything else hangs off: it wraps an
//! async [`GuardedAction`] so that re-invocations while it is in flight are
//! dropped, and it exposes the busy flag a control binds its disabled
//! attribute to. The network ([`network`]) and navigation ([`navigation`])
//! layers supply the sub-steps of [`FetchThenNavigate`], the action behind
//! the submit button.

pub mod action;
pub mod controls;
pub mod error;
pub mod flow;
pub mod mocking;
pub mod navigation;
pub mod network;
pub mod trigger;

pub use action::{action_fn, FnAction, GuardedAction};
pub use controls::{Button, ControlView, Counter, Form};
pub use error::{ActionError, FetchError, NavigationError};
pub use flow::FetchThenNavigate;
pub use mocking::{MockSettings, RunMode};
pub use navigation::{Location, Navigator, Page, RouteTable, Router};
pub use network::{HttpItemsSource, ItemsSource, MockItemsSource};
pub use trigger::{
    BusyGuard, BusySignal, GuardedTrigger, Invocation, TransitionFeed, TriggerState,
};
