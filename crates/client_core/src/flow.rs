//! The guarded sequence behind the submit button: fetch items, then navigate.

use async_trait::async_trait;
use shared::{domain::RoutePath, protocol::ItemsResponse};
use tracing::info;

use crate::{
    action::GuardedAction, error::ActionError, navigation::Navigator, network::ItemsSource,
};

pub struct FetchThenNavigate<S, N> {
    source: S,
    navigator: N,
    destination: RoutePath,
}

impl<S, N> FetchThenNavigate<S, N>
where
    S: ItemsSource,
    N: Navigator,
{
    /// Navigates to the top page once the items have been fetched.
    pub fn new(source: S, navigator: N) -> Self {
        Self::to(source, navigator, RoutePath::root())
    }

    pub fn to(source: S, navigator: N, destination: impl Into<RoutePath>) -> Self {
        Self {
            source,
            navigator,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl<S, N> GuardedAction for FetchThenNavigate<S, N>
where
    S: ItemsSource,
    N: Navigator,
{
    type Output = ItemsResponse;
    type Error = ActionError;

    async fn run(&self) -> Result<ItemsResponse, ActionError> {
        let response = self.source.fetch_items().await?;
        for item in &response.items {
            info!(item_id = item.id.0, name = %item.name, "fetched item");
        }
        self.navigator.navigate(&self.destination).await?;
        Ok(response)
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
