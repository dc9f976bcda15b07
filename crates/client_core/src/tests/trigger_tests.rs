use super::*;

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::{sleep, timeout, Instant};

use crate::action::action_fn;

struct SlowAction {
    runs: Arc<AtomicUsize>,
    delay: Duration,
    fail: bool,
}

impl SlowAction {
    fn ok(delay: Duration) -> Self {
        Self {
            runs: Arc::new(AtomicUsize::new(0)),
            delay,
            fail: false,
        }
    }

    fn failing(delay: Duration) -> Self {
        Self {
            fail: true,
            ..Self::ok(delay)
        }
    }
}

#[async_trait]
impl GuardedAction for SlowAction {
    type Output = usize;
    type Error = String;

    async fn run(&self) -> Result<usize, String> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        sleep(self.delay).await;
        if self.fail {
            Err(format!("run {run} failed"))
        } else {
            Ok(run)
        }
    }
}

#[tokio::test(start_paused = true)]
async fn repeated_invocations_while_busy_run_the_action_once() {
    let action = SlowAction::ok(Duration::from_millis(100));
    let runs = Arc::clone(&action.runs);
    let trigger = GuardedTrigger::new("submit", action);

    let (first, second, third) = tokio::join!(trigger.invoke(), trigger.invoke(), trigger.invoke());

    assert_eq!(first.expect("first invocation"), Invocation::Completed(1));
    assert!(second.expect("second invocation").is_dropped());
    assert!(third.expect("third invocation").is_dropped());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(!trigger.is_busy());
}

#[tokio::test(start_paused = true)]
async fn busy_flag_follows_a_100ms_action() {
    let trigger = GuardedTrigger::new("submit", SlowAction::ok(Duration::from_millis(100)));
    let mut signal = trigger.subscribe();
    let started = Instant::now();

    let handle = trigger.fire().expect("first click starts the action");
    assert!(trigger.is_busy());
    assert!(signal.is_busy());

    sleep(Duration::from_millis(99)).await;
    assert!(trigger.is_busy());

    signal.wait_idle().await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(110), "{elapsed:?}");
    assert!(!trigger.is_busy());

    assert_eq!(handle.await.expect("join").expect("action"), 1);
}

#[tokio::test(start_paused = true)]
async fn second_synchronous_fire_is_dropped() {
    let action = SlowAction::ok(Duration::from_millis(10));
    let runs = Arc::clone(&action.runs);
    let trigger = GuardedTrigger::new("submit", action);

    let first = trigger.fire();
    let second = trigger.fire();

    assert!(first.is_some());
    assert!(second.is_none());
    first
        .expect("first handle")
        .await
        .expect("join")
        .expect("action");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_action_releases_flag_and_returns_error() {
    let trigger = GuardedTrigger::new("submit", SlowAction::failing(Duration::from_millis(20)));

    let err = trigger.invoke().await.expect_err("error reaches the caller");

    assert_eq!(err, "run 1 failed");
    assert!(!trigger.is_busy());
}

#[tokio::test(start_paused = true)]
async fn failing_fired_action_surfaces_through_handle() {
    let trigger = GuardedTrigger::new("submit", SlowAction::failing(Duration::from_millis(20)));

    let handle = trigger.fire().expect("fired");
    let err = handle.await.expect("join").expect_err("action error");

    assert_eq!(err, "run 1 failed");
    assert!(!trigger.is_busy());
    assert!(trigger.fire().is_some(), "control is usable again");
}

#[tokio::test(start_paused = true)]
async fn invoking_after_settlement_starts_a_fresh_run() {
    let trigger = GuardedTrigger::new("submit", SlowAction::ok(Duration::from_millis(5)));

    let first = trigger.invoke().await.expect("first");
    let second = trigger.invoke().await.expect("second");

    assert_eq!(first, Invocation::Completed(1));
    assert_eq!(second, Invocation::Completed(2));
}

#[tokio::test(start_paused = true)]
async fn cancelled_invocation_releases_flag() {
    let action = SlowAction::ok(Duration::from_millis(100));
    let runs = Arc::clone(&action.runs);
    let trigger = GuardedTrigger::new("submit", action);

    let cancelled = timeout(Duration::from_millis(10), trigger.invoke()).await;
    assert!(cancelled.is_err());
    assert!(!trigger.is_busy());

    let again = trigger.invoke().await.expect("second invocation");
    assert_eq!(again, Invocation::Completed(2));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn panicking_action_releases_flag() {
    let trigger = GuardedTrigger::new(
        "submit",
        action_fn(|| async {
            if true {
                panic!("boom");
            }
            Ok::<(), String>(())
        }),
    );

    let handle = trigger.fire().expect("fired");
    let join_error = handle.await.expect_err("task panicked");

    assert!(join_error.is_panic());
    assert!(!trigger.is_busy());
}

#[tokio::test(start_paused = true)]
async fn busy_signal_reports_each_transition() {
    let trigger = GuardedTrigger::new("submit", SlowAction::ok(Duration::from_millis(50)));
    let mut signal = trigger.subscribe();

    let handle = trigger.fire().expect("fired");
    assert_eq!(signal.changed().await, Some(true));
    assert_eq!(signal.changed().await, Some(false));

    handle.await.expect("join").expect("action");
}

#[tokio::test(start_paused = true)]
async fn caller_owned_state_reflects_the_trigger() {
    let state = TriggerState::new();
    let trigger = GuardedTrigger::with_state(
        "submit",
        SlowAction::ok(Duration::from_millis(30)),
        state.clone(),
    );

    let handle = trigger.fire().expect("fired");
    assert!(state.is_busy());
    assert!(state.try_acquire().is_none());

    handle.await.expect("join").expect("action");
    assert!(!state.is_busy());
}

#[test]
fn guard_resets_flag_on_drop() {
    let state = TriggerState::new();

    let guard = state.try_acquire().expect("idle state can be acquired");
    assert!(state.is_busy());
    assert!(state.try_acquire().is_none());

    drop(guard);
    assert!(!state.is_busy());
    assert!(state.try_acquire().is_some());
}

#[tokio::test(start_paused = true)]
async fn invoke_takes_flag_before_first_poll() {
    let action = SlowAction::ok(Duration::from_millis(40));
    let runs = Arc::clone(&action.runs);
    let trigger = GuardedTrigger::new("submit", action);

    let pending = trigger.invoke();
    assert!(trigger.is_busy());
    assert!(trigger.invoke().await.expect("second").is_dropped());

    assert_eq!(pending.await.expect("first"), Invocation::Completed(1));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(!trigger.is_busy());
}

#[tokio::test(start_paused = true)]
async fn unpolled_invocation_releases_flag_on_drop() {
    let trigger = GuardedTrigger::new("submit", SlowAction::ok(Duration::from_millis(40)));

    let pending = trigger.invoke();
    assert!(trigger.is_busy());
    drop(pending);

    assert!(!trigger.is_busy());
    assert_eq!(trigger.invoke().await.expect("fresh"), Invocation::Completed(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn transition_feed_keeps_every_step_of_instant_actions() {
    let trigger = GuardedTrigger::new("submit", action_fn(|| async { Ok::<_, String>(()) }));

    for _ in 0..200 {
        let mut feed = trigger.transitions();
        let handle = trigger.fire().expect("idle trigger fires");
        handle.await.expect("join").expect("action");

        assert_eq!(feed.next().await, Some(true));
        assert_eq!(feed.next().await, Some(false));
    }
}

#[tokio::test]
async fn transition_feed_ends_when_state_is_dropped() {
    let state = TriggerState::new();
    let mut feed = state.transitions();

    drop(state.try_acquire().expect("acquire"));
    drop(state);

    assert_eq!(feed.next().await, Some(true));
    assert_eq!(feed.next().await, Some(false));
    assert_eq!(feed.next().await, None);
}
