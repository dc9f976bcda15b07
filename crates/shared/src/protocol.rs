use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Item;

pub const ITEMS_ROUTE: &str = "/items";
pub const HEALTH_ROUTE: &str = "/healthz";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
    pub served_at: DateTime<Utc>,
}

impl ItemsResponse {
    pub fn now(items: Vec<Item>) -> Self {
        Self {
            items,
            served_at: Utc::now(),
        }
    }
}

/// Items served when nothing else is configured.
pub fn default_items() -> Vec<Item> {
    vec![
        Item::new(1, "John Doe"),
        Item::new(2, "Jane Roe"),
        Item::new(3, "Richard Miles"),
    ]
}
