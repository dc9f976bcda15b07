use std::future::Future;

use async_trait::async_trait;

/// An operation a [`GuardedTrigger`](crate::GuardedTrigger) runs at most once
/// at a time. Sub-steps inside `run` are opaque to the trigger.
#[async_trait]
pub trait GuardedAction: Send + Sync {
    type Output: Send;
    type Error: Send;

    async fn run(&self) -> Result<Self::Output, Self::Error>;
}

/// Adapter turning an async closure into a [`GuardedAction`].
pub struct FnAction<F> {
    f: F,
}

pub fn action_fn<F>(f: F) -> FnAction<F> {
    FnAction { f }
}

#[async_trait]
impl<F, Fut, T, E> GuardedAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    async fn run(&self) -> Result<T, E> {
        (self.f)().await
    }
}
