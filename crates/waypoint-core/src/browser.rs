//! Browser session.
//!
//! The browser is the single owner of route state. Every navigation
//! resolves the new location, renders it, updates mounted routes and then
//! publishes one immutable [`RouteMatchState`] through a watch channel, so
//! observers never see a half-applied navigation.

use crate::effect::{MountContext, MountGuard};
use crate::error::RouterError;
use crate::history::{History, NavigationType};
use crate::matcher::{Params, Resolution};
use crate::navigator::{Command, NavigateOptions, Navigator};
use crate::outlet::{HandledError, Rendered};
use crate::route::RouteId;
use crate::router::Router;
use crate::view::{Action, View};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use waypoint_location::{Location, QueryParams};

/// Everything known about the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatchState {
    /// Current location.
    pub location: Location,
    /// Resolution of the location.
    pub resolution: Resolution,
    /// Rendered view.
    pub view: View,
    /// Errors handled by boundaries while rendering.
    pub handled: Vec<HandledError>,
    /// How this state was reached.
    pub navigation: NavigationType,
    /// History cursor.
    pub history_index: usize,
    /// Increments on every applied navigation.
    pub revision: u64,
}

impl RouteMatchState {
    fn build(router: &Router, history: &History, navigation: NavigationType, revision: u64) -> Self {
        let location = history.location().clone();
        let resolution = router.resolve(&location);
        let Rendered { view, handled } = router.render(&location, &resolution);
        Self {
            location,
            resolution,
            view,
            handled,
            navigation,
            history_index: history.index(),
            revision,
        }
    }

    /// Parameters bound by the deepest matched route.
    #[must_use]
    pub fn params(&self) -> Params {
        self.resolution.params()
    }

    /// Current query parameters.
    #[must_use]
    pub fn search_params(&self) -> &QueryParams {
        self.location.search()
    }

    /// Check if the location fell back to a not-found boundary.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.resolution.is_not_found()
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The request did not change the location.
    Unchanged,
    /// A new state was published.
    Navigated {
        /// The published state.
        state: Arc<RouteMatchState>,
        /// Routes that entered the active chain.
        mounted: Vec<RouteId>,
        /// Routes that left the active chain.
        unmounted: Vec<RouteId>,
    },
}

impl NavigationOutcome {
    /// Check if a new state was published.
    #[must_use]
    pub fn is_navigated(&self) -> bool {
        matches!(self, Self::Navigated { .. })
    }

    /// The published state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&Arc<RouteMatchState>> {
        match self {
            Self::Navigated { state, .. } => Some(state),
            Self::Unchanged => None,
        }
    }
}

/// A route currently in the active chain.
struct Mounted {
    route_id: RouteId,
    /// Cleared on unmount; commands queued by this mount check it.
    live: Arc<AtomicBool>,
    guard: Option<MountGuard>,
}

/// A browsing session over a router.
pub struct Browser {
    router: Arc<Router>,
    history: History,
    navigator: Navigator,
    state: watch::Sender<Arc<RouteMatchState>>,
    mounted: Vec<Mounted>,
    revision: u64,
}

impl Browser {
    /// Open a session at `initial`.
    ///
    /// Mount hooks of the initial chain run immediately; hooks that schedule
    /// [`Deferred`](crate::Deferred) tasks need a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial` is not a valid in-app href.
    pub fn new(router: Arc<Router>, navigator: Navigator, initial: &str) -> Result<Self, RouterError> {
        let history = History::new(Location::parse(initial)?);
        let state = Arc::new(RouteMatchState::build(
            &router,
            &history,
            NavigationType::Pop,
            0,
        ));
        let (sender, _) = watch::channel(state.clone());

        let mut browser = Self {
            router,
            history,
            navigator,
            state: sender,
            mounted: Vec::new(),
            revision: 0,
        };
        browser.sync_mounts(&state);

        info!(path = %state.location, "Browser session started");
        Ok(browser)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> Arc<RouteMatchState> {
        self.state.borrow().clone()
    }

    /// Current location.
    #[must_use]
    pub fn location(&self) -> &Location {
        self.history.location()
    }

    /// Current rendered view.
    #[must_use]
    pub fn view(&self) -> View {
        self.state.borrow().view.clone()
    }

    /// Subscribe to published states.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<RouteMatchState>> {
        self.state.subscribe()
    }

    /// Navigator feeding this session's command queue.
    #[must_use]
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    /// Session history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The router.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Ids of mounted routes, root first.
    #[must_use]
    pub fn mounted_routes(&self) -> Vec<&RouteId> {
        self.mounted.iter().map(|m| &m.route_id).collect()
    }

    /// Deferred tasks still pending across mounted routes.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.mounted
            .iter()
            .filter_map(|m| m.guard.as_ref())
            .map(MountGuard::pending_tasks)
            .sum()
    }

    /// Navigate to an href, relative to the current pathname.
    ///
    /// Navigating to the current href is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the href cannot be resolved.
    pub fn navigate(&mut self, to: &str, options: NavigateOptions) -> Result<NavigationOutcome, RouterError> {
        let target = Location::resolve(self.history.location().pathname(), to)?;
        Ok(self.go_to(target, options))
    }

    /// Replace the query parameters, keeping the pathname.
    pub fn set_search_params(&mut self, params: QueryParams) -> NavigationOutcome {
        let target = self.history.location().with_search(params);
        self.go_to(target, NavigateOptions::default())
    }

    /// Go back one entry.
    pub fn back(&mut self) -> NavigationOutcome {
        self.go(-1)
    }

    /// Go forward one entry.
    pub fn forward(&mut self) -> NavigationOutcome {
        self.go(1)
    }

    /// Move through history; out-of-range moves are no-ops.
    pub fn go(&mut self, delta: isize) -> NavigationOutcome {
        if self.history.go(delta).is_none() {
            debug!(delta, "History move out of range");
            return NavigationOutcome::Unchanged;
        }
        self.commit(NavigationType::Pop)
    }

    /// Perform a view action.
    ///
    /// # Errors
    ///
    /// Returns an error if a navigation target cannot be resolved.
    pub fn activate(&mut self, action: &Action) -> Result<NavigationOutcome, RouterError> {
        match action {
            Action::Navigate { to, replace } => {
                self.navigate(to, NavigateOptions { replace: *replace })
            }
            Action::Back => Ok(self.back()),
            Action::Forward => Ok(self.forward()),
        }
    }

    /// Activate the link or button with this label in the current view.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NoSuchControl`] if nothing has the label.
    pub fn click(&mut self, label: &str) -> Result<NavigationOutcome, RouterError> {
        let action = self
            .state
            .borrow()
            .view
            .find_action(label)
            .ok_or_else(|| RouterError::NoSuchControl(label.to_string()))?;
        self.activate(&action)
    }

    /// Apply a queued command.
    ///
    /// # Errors
    ///
    /// Returns an error if a navigation target cannot be resolved.
    pub fn apply(&mut self, command: Command) -> Result<NavigationOutcome, RouterError> {
        match command {
            Command::Navigate { to, options } => self.navigate(&to, options),
            Command::SetSearchParams(params) => Ok(self.set_search_params(params)),
            Command::Go(delta) => Ok(self.go(delta)),
        }
    }

    fn go_to(&mut self, target: Location, options: NavigateOptions) -> NavigationOutcome {
        if target == *self.history.location() {
            debug!(path = %target, "Already at location");
            return NavigationOutcome::Unchanged;
        }
        let navigation = if options.replace {
            self.history.replace(target);
            NavigationType::Replace
        } else {
            self.history.push(target);
            NavigationType::Push
        };
        self.commit(navigation)
    }

    fn commit(&mut self, navigation: NavigationType) -> NavigationOutcome {
        self.revision += 1;
        let state = Arc::new(RouteMatchState::build(
            &self.router,
            &self.history,
            navigation,
            self.revision,
        ));
        let (mounted, unmounted) = self.sync_mounts(&state);
        self.state.send_replace(state.clone());

        info!(
            path = %state.location,
            kind = navigation.as_str(),
            not_found = state.is_not_found(),
            "Navigated"
        );
        NavigationOutcome::Navigated {
            state,
            mounted,
            unmounted,
        }
    }

    /// Unmount routes that left the chain (deepest first), then mount new
    /// ones (root first).
    fn sync_mounts(&mut self, state: &RouteMatchState) -> (Vec<RouteId>, Vec<RouteId>) {
        let active = state.resolution.rendered();

        let mut unmounted = Vec::new();
        let mut i = self.mounted.len();
        while i > 0 {
            i -= 1;
            if !active.iter().any(|m| m.route_id == self.mounted[i].route_id) {
                let gone = self.mounted.remove(i);
                gone.live.store(false, Ordering::Release);
                debug!(route = %gone.route_id, "Route unmounted");
                unmounted.push(gone.route_id);
            }
        }

        let mut mounted = Vec::new();
        for matched in active {
            if self.mounted.iter().any(|m| m.route_id == matched.route_id) {
                continue;
            }
            let live = Arc::new(AtomicBool::new(true));
            let entry = self.router.entry(matched.index);
            let guard = entry.on_mount.as_ref().map(|hook| {
                let navigator = self
                    .navigator
                    .issued_by(matched.route_id.clone(), live.clone());
                hook(&MountContext {
                    route_id: &matched.route_id,
                    location: &state.location,
                    params: &matched.params,
                    navigator: &navigator,
                })
            });
            debug!(route = %matched.route_id, hooked = guard.is_some(), "Route mounted");
            self.mounted.push(Mounted {
                route_id: matched.route_id.clone(),
                live,
                guard,
            });
            mounted.push(matched.route_id.clone());
        }

        (mounted, unmounted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Deferred;
    use crate::error::RenderError;
    use crate::navigator::Commands;
    use crate::outlet::RenderContext;
    use crate::route::Route;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn layout(ctx: &RenderContext<'_>) -> Result<View, RenderError> {
        Ok(View::fragment(vec![
            View::element("nav", vec![ctx.link("/", "Home"), ctx.button("About", "/about")]),
            ctx.outlet()?,
        ]))
    }

    fn not_found(_: &RenderContext<'_>) -> Result<View, RenderError> {
        Ok(View::heading("Not Found"))
    }

    fn router(mounts: Arc<AtomicUsize>, unmounts: Arc<AtomicUsize>) -> Arc<Router> {
        Arc::new(
            Router::new(vec![Route::new("/")
                .id("root")
                .element(layout)
                .error_element(not_found)
                .children(vec![
                    Route::new("")
                        .id("home")
                        .element(|ctx| {
                            Ok(View::paragraph(format!(
                                "home day={}",
                                ctx.search_params().get("day").unwrap_or("-")
                            )))
                        })
                        .on_mount(move |mount| {
                            mounts.fetch_add(1, Ordering::SeqCst);
                            let unmounts = unmounts.clone();
                            let navigator = mount.navigator();
                            MountGuard::from(Deferred::after(Duration::from_secs(3), async move {
                                let _ = navigator
                                    .set_search_params(QueryParams::parse("day=today&tomorrow=123"));
                            }))
                            .on_unmount(move || {
                                unmounts.fetch_add(1, Ordering::SeqCst);
                            })
                        }),
                    Route::new("about").id("about").element(|_| Ok(View::heading("About"))),
                ])])
            .unwrap(),
        )
    }

    fn session(initial: &str) -> (Browser, Commands, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let mounts = Arc::new(AtomicUsize::new(0));
        let unmounts = Arc::new(AtomicUsize::new(0));
        let (navigator, commands) = Navigator::channel();
        let browser = Browser::new(router(mounts.clone(), unmounts.clone()), navigator, initial).unwrap();
        (browser, commands, mounts, unmounts)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (browser, _commands, mounts, _) = session("/");
        let state = browser.state();
        assert_eq!(state.revision, 0);
        assert_eq!(state.navigation, NavigationType::Pop);
        assert!(state.view.text_content().contains("home day=-"));
        assert_eq!(mounts.load(Ordering::SeqCst), 1);
        let ids: Vec<_> = browser.mounted_routes().into_iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["root", "home"]);
        assert_eq!(browser.pending_tasks(), 1);
    }

    #[tokio::test]
    async fn test_navigate_back_and_forward() {
        let (mut browser, _commands, _, _) = session("/");

        let outcome = browser.navigate("/about", NavigateOptions::default()).unwrap();
        assert!(outcome.is_navigated());
        assert!(browser.view().text_content().contains("About"));
        assert_eq!(browser.history().len(), 2);

        assert!(browser.back().is_navigated());
        assert_eq!(browser.location().pathname(), "/");
        assert_eq!(browser.state().navigation, NavigationType::Pop);

        assert!(browser.forward().is_navigated());
        assert_eq!(browser.location().pathname(), "/about");
        assert!(!browser.forward().is_navigated());
    }

    #[tokio::test]
    async fn test_same_location_is_noop() {
        let (mut browser, _commands, mounts, _) = session("/about");
        let before = browser.state();

        let outcome = browser.navigate("/about", NavigateOptions::default()).unwrap();
        assert!(!outcome.is_navigated());
        assert_eq!(browser.history().len(), 1);
        assert_eq!(browser.state().revision, before.revision);
        assert_eq!(mounts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_replace_keeps_history_length() {
        let (mut browser, _commands, _, _) = session("/");
        browser.navigate("/about", NavigateOptions::replace()).unwrap();
        assert_eq!(browser.history().len(), 1);
        assert_eq!(browser.state().navigation, NavigationType::Replace);
    }

    #[tokio::test]
    async fn test_click_link_and_button() {
        let (mut browser, _commands, _, _) = session("/");
        browser.click("About").unwrap();
        assert_eq!(browser.location().pathname(), "/about");
        browser.click("Home").unwrap();
        assert_eq!(browser.location().pathname(), "/");
        assert!(matches!(
            browser.click("Nope"),
            Err(RouterError::NoSuchControl(_))
        ));
    }

    #[tokio::test]
    async fn test_unmatched_path_renders_boundary() {
        let (mut browser, _commands, _, _) = session("/");
        let outcome = browser.navigate("/missing", NavigateOptions::default()).unwrap();
        let state = outcome.state().unwrap();
        assert!(state.is_not_found());
        assert_eq!(state.view.text_content(), "Not Found");
        assert_eq!(state.handled.len(), 1);
        assert!(browser.mounted_routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_search_update_applies_once() {
        let (mut browser, mut commands, mounts, unmounts) = session("/");

        let command = commands.next().await.unwrap();
        let outcome = browser.apply(command).unwrap();
        assert!(outcome.is_navigated());
        assert_eq!(browser.location().href(), "/?day=today&tomorrow=123");
        assert!(browser.view().text_content().contains("home day=today"));

        // The query update keeps Home mounted, so nothing is rescheduled.
        assert_eq!(mounts.load(Ordering::SeqCst), 1);
        assert_eq!(unmounts.load(Ordering::SeqCst), 0);
        let more = tokio::time::timeout(Duration::from_secs(10), commands.next()).await;
        assert!(more.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_home_cancels_deferred_update() {
        let (mut browser, mut commands, _, unmounts) = session("/");

        tokio::time::sleep(Duration::from_secs(1)).await;
        let outcome = browser.navigate("/about", NavigateOptions::default()).unwrap();
        match outcome {
            NavigationOutcome::Navigated { unmounted, .. } => {
                assert_eq!(unmounted, vec![RouteId::from("home")]);
            }
            NavigationOutcome::Unchanged => panic!("expected navigation"),
        }
        assert_eq!(unmounts.load(Ordering::SeqCst), 1);
        assert_eq!(browser.pending_tasks(), 0);

        let fired = tokio::time::timeout(Duration::from_secs(10), commands.next()).await;
        assert!(fired.is_err());
        assert_eq!(browser.location().pathname(), "/about");
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_update_from_unmounted_route_is_dropped() {
        let (mut browser, mut commands, _, unmounts) = session("/");

        tokio::time::sleep(Duration::from_secs(4)).await;
        browser.navigate("/about", NavigateOptions::default()).unwrap();
        assert_eq!(unmounts.load(Ordering::SeqCst), 1);

        assert_eq!(commands.try_next(), None);
        assert_eq!(browser.location().href(), "/about");
    }

    #[tokio::test]
    async fn test_subscribers_see_whole_states() {
        let (mut browser, _commands, _, _) = session("/");
        let mut rx = browser.subscribe();

        browser.navigate("/about", NavigateOptions::default()).unwrap();
        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.location.pathname(), "/about");
        assert_eq!(state.revision, 1);
        assert!(state.view.text_content().contains("About"));
    }

    #[tokio::test]
    async fn test_relative_navigation() {
        let (mut browser, _commands, _, _) = session("/about");
        browser.navigate("..", NavigateOptions::default()).unwrap();
        assert_eq!(browser.location().pathname(), "/");
        assert!(browser
            .navigate("https://example.com", NavigateOptions::default())
            .is_err());
    }
}
