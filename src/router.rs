use crate::{
    auth::{AccessGate, can_navigate_to},
    display::{DisplayState, LocationState},
    errors::{NavigationError, ViewError},
    models::{PageId, RouterSession},
    routes::{self, RouteTable, View},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Instrument;
use uuid::Uuid;

/// Where a navigation event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Location change: hashchange or the initial load.
    Hash,
    /// A page asked to move on.
    Programmatic,
}

impl Origin {
    fn as_str(&self) -> &'static str {
        match self {
            Origin::Hash => "hash",
            Origin::Programmatic => "programmatic",
        }
    }
}

/// NavigationOutcome
///
/// What one navigation event ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// The page was committed. `hook_error` carries a failed post-render hook,
    /// which does not undo the render.
    Rendered {
        page: PageId,
        hook_error: Option<ViewError>,
    },
    /// The location was pointed elsewhere and nothing was rendered.
    Redirected(PageId),
    /// A transition was in flight; the event was ignored.
    Dropped,
    /// The hash names the page already on screen.
    AlreadyShowing(PageId),
    /// Nothing could be rendered; the static error page is shown.
    Failed(NavigationError),
}

/// Resets the transitioning flag on every exit path of a transition.
struct TransitionGuard<'a>(&'a AtomicBool);

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Router
///
/// Two-state machine (`Idle` / `Transitioning`) between navigation events and the
/// display region. At most one render is in flight: any event that arrives while
/// a view's completion hook is pending is dropped, not queued. The location is
/// the source of truth for the last requested page, so a dropped event is simply
/// observed again the next time the location changes.
pub struct Router {
    routes: RouteTable,
    access: Arc<AccessGate>,
    display: DisplayState,
    location: LocationState,
    transitioning: AtomicBool,
    current_page: Mutex<Option<PageId>>,
}

impl Router {
    pub fn new(
        routes: RouteTable,
        access: Arc<AccessGate>,
        display: DisplayState,
        location: LocationState,
    ) -> Self {
        Self {
            routes,
            access,
            display,
            location,
            transitioning: AtomicBool::new(false),
            current_page: Mutex::new(None),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning.load(Ordering::Acquire)
    }

    pub fn current_page(&self) -> Option<PageId> {
        *self
            .current_page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> RouterSession {
        RouterSession {
            current_page: self.current_page(),
            transitioning: self.is_transitioning(),
        }
    }

    fn set_current_page(&self, page: Option<PageId>) {
        *self
            .current_page
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = page;
    }

    /// hash_observed
    ///
    /// Entry point for location changes and for the initial load. `raw` is the
    /// fragment as found in the location; absent or unknown values mean `home`.
    pub async fn hash_observed(&self, raw: Option<&str>) -> NavigationOutcome {
        let span = tracing::info_span!(
            "navigation",
            nav_id = %Uuid::new_v4(),
            origin = Origin::Hash.as_str(),
            requested = raw.unwrap_or(""),
        );
        self.dispatch(PageId::resolve(raw), Origin::Hash)
            .instrument(span)
            .await
    }

    /// navigate
    ///
    /// Programmatic entry point used by the action handlers. An approved target is
    /// written into the location before it is rendered.
    pub async fn navigate(&self, target: PageId) -> NavigationOutcome {
        let span = tracing::info_span!(
            "navigation",
            nav_id = %Uuid::new_v4(),
            origin = Origin::Programmatic.as_str(),
            requested = target.as_str(),
        );
        self.dispatch(target, Origin::Programmatic)
            .instrument(span)
            .await
    }

    /// `Idle -> Transitioning -> Idle` for one event.
    async fn dispatch(&self, target: PageId, origin: Origin) -> NavigationOutcome {
        // 1. Mutual exclusion: no queueing, the event is simply ignored. Every
        // path below, redirects and recovery included, runs under the claim.
        if self
            .transitioning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(%target, "Navigation dropped: transition in flight");
            return NavigationOutcome::Dropped;
        }
        let _guard = TransitionGuard(&self.transitioning);

        // 2. Navigation policy.
        let access = self.access.snapshot();
        if !can_navigate_to(target, &access) {
            if target != PageId::Gate && !access.accepted() {
                tracing::warn!(%target, "Access denied: code required, redirecting to gate");
                self.location.set_hash(PageId::Gate);
                return NavigationOutcome::Redirected(PageId::Gate);
            }
            tracing::warn!(%target, "Access denied, redirecting home");
            self.location.set_hash(PageId::Home);
            return NavigationOutcome::Redirected(PageId::Home);
        }

        // 3. Echo of a change this router already rendered.
        if origin == Origin::Hash && self.current_page() == Some(target) {
            tracing::debug!(%target, "Page already showing");
            return NavigationOutcome::AlreadyShowing(target);
        }

        // 4. View lookup.
        let Some(view) = self.routes.get(target) else {
            let err = NavigationError::NoView(target);
            tracing::error!(error = %err, "Route not found");
            return self.recover(target, err);
        };

        if origin == Origin::Programmatic {
            self.location.set_hash(target);
        }

        self.transition(target, view.as_ref()).await
    }

    /// transition
    ///
    /// Render, commit, then await the optional completion hook. Called with the
    /// transitioning flag held by `dispatch`.
    async fn transition(&self, target: PageId, view: &dyn View) -> NavigationOutcome {
        let previous = self.current_page();
        self.set_current_page(Some(target));

        let markup = view.render();
        if let Err(source) = self.display.commit(&markup) {
            self.set_current_page(previous);
            let err = NavigationError::Render {
                page: target,
                source,
            };
            tracing::error!(error = %err, "Error during page transition");
            return self.recover(target, err);
        }
        tracing::info!(page = %target, "Page rendered");

        let hook_error = match view.completion() {
            Some(hook) => match hook.after_render().await {
                Ok(()) => None,
                Err(e) => {
                    tracing::error!(error = %e, "Error in view after_render");
                    Some(e)
                }
            },
            None => None,
        };

        NavigationOutcome::Rendered {
            page: target,
            hook_error,
        }
    }

    /// recover
    ///
    /// Navigation errors degrade to a redirect home. When home itself is the
    /// failing page there is nowhere left to go, so the static error page is shown.
    fn recover(&self, target: PageId, err: NavigationError) -> NavigationOutcome {
        if target != PageId::Home {
            self.location.set_hash(PageId::Home);
            return NavigationOutcome::Redirected(PageId::Home);
        }

        if let Err(e) = self.display.commit(&routes::error_page()) {
            tracing::error!(error = %e, "Error page could not be shown");
        }
        NavigationOutcome::Failed(err)
    }
}
