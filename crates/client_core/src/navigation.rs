//! Navigation layer: a small client-side router with an error boundary.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::domain::RoutePath;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::NavigationError;

pub const ERROR_BOUNDARY_MESSAGE: &str = "Sorry, an unexpected error has occurred.";
/// Oldest entries are discarded past this depth.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    App,
    Button,
    ScriptSync,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::App => "Vite + React",
            Page::Button => "Button Examples",
            Page::ScriptSync => "Script sync Examples",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Page { path: RoutePath, page: Page },
    ErrorBoundary { path: RoutePath, message: String },
}

impl Location {
    pub fn path(&self) -> &RoutePath {
        match self {
            Location::Page { path, .. } | Location::ErrorBoundary { path, .. } => path,
        }
    }

    pub fn page(&self) -> Option<Page> {
        match self {
            Location::Page { page, .. } => Some(*page),
            Location::ErrorBoundary { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Location::ErrorBoundary { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Page { path, page } => write!(f, "{path} ({})", page.title()),
            Location::ErrorBoundary { path, message } => write!(f, "{path} (Oops! {message})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<RoutePath, Page>,
}

impl RouteTable {
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn with_route(mut self, path: impl Into<RoutePath>, page: Page) -> Self {
        self.routes.insert(path.into(), page);
        self
    }

    pub fn resolve(&self, path: &RoutePath) -> Option<Page> {
        self.routes.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::empty()
            .with_route("/", Page::App)
            .with_route("/button", Page::Button)
            .with_route("/script_sync_example", Page::ScriptSync)
    }
}

#[async_trait]
pub trait Navigator: Send + Sync {
    /// Resolves once the view change has been committed.
    async fn navigate(&self, to: &RoutePath) -> Result<(), NavigationError>;

    fn location(&self) -> Location;
}

#[async_trait]
impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    async fn navigate(&self, to: &RoutePath) -> Result<(), NavigationError> {
        (**self).navigate(to).await
    }

    fn location(&self) -> Location {
        (**self).location()
    }
}

pub struct Router {
    routes: RouteTable,
    current: watch::Sender<Location>,
    history: Mutex<VecDeque<Location>>,
    transition_delay: Duration,
    navigations: AtomicUsize,
    mounted: AtomicBool,
}

impl Router {
    /// Mounts the router at `initial`. An unknown initial path starts on the
    /// error boundary.
    pub fn new(routes: RouteTable, initial: impl Into<RoutePath>) -> Self {
        let initial = initial.into();
        let location = Self::render(&routes, &initial);
        let (current, _) = watch::channel(location);
        Self {
            routes,
            current,
            history: Mutex::new(VecDeque::new()),
            transition_delay: Duration::ZERO,
            navigations: AtomicUsize::new(0),
            mounted: AtomicBool::new(true),
        }
    }

    /// Time a navigation takes to commit.
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.current.subscribe()
    }

    /// Committed navigations, including ones that landed on the error boundary.
    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or_default()
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Returns to the previous location. `false` when history is empty.
    pub fn back(&self) -> bool {
        let previous = match self.history.lock() {
            Ok(mut history) => history.pop_back(),
            Err(_) => None,
        };
        match previous {
            Some(location) => {
                self.current.send_replace(location);
                true
            }
            None => false,
        }
    }

    fn render(routes: &RouteTable, path: &RoutePath) -> Location {
        match routes.resolve(path) {
            Some(page) => Location::Page {
                path: path.clone(),
                page,
            },
            None => Location::ErrorBoundary {
                path: path.clone(),
                message: ERROR_BOUNDARY_MESSAGE.to_string(),
            },
        }
    }

    fn commit(&self, location: Location) {
        let previous = self.current.send_replace(location);
        if let Ok(mut history) = self.history.lock() {
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(previous);
        }
        self.navigations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Navigator for Router {
    async fn navigate(&self, to: &RoutePath) -> Result<(), NavigationError> {
        if !self.mounted.load(Ordering::SeqCst) {
            return Err(NavigationError::Unmounted);
        }
        if !self.transition_delay.is_zero() {
            tokio::time::sleep(self.transition_delay).await;
        }
        if !self.mounted.load(Ordering::SeqCst) {
            return Err(NavigationError::Unmounted);
        }

        let location = Self::render(&self.routes, to);
        if location.is_error() {
            error!(path = %to, "no route matched; rendering error boundary");
            self.commit(location);
            return Err(NavigationError::NotFound(to.clone()));
        }

        info!(path = %to, "navigated");
        self.commit(location);
        Ok(())
    }

    fn location(&self) -> Location {
        self.current.borrow().clone()
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
