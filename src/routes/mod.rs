//! Route Table Module Index
//!
//! Organizes the card's views by access level, mirroring the navigation policy:
//! pages in `open` are reachable by anyone, pages in `gated` only after the code
//! has been accepted. The split is informational; the router enforces the
//! policy itself.

use crate::{
    assets::{AssetState, ImageAsset},
    display::DisplayState,
    errors::ViewError,
    models::PageId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Views reachable without the code (home, gate).
pub mod open;

/// Views unlocked by the accepted code.
pub mod gated;

/// Rendered markup of a view.
pub type Markup = String;

/// View
///
/// A renderable page. `render` is synchronous and infallible. A view that needs
/// asynchronous setup after its markup is on screen advertises it by returning
/// its hook from `completion`; the router awaits that hook before going idle.
pub trait View: Send + Sync {
    fn render(&self) -> Markup;

    fn completion(&self) -> Option<&dyn CompletionHook> {
        None
    }
}

/// CompletionHook
///
/// The optional post-render capability of a view. Failures are caught and
/// logged by the router; they never roll back the committed markup.
#[async_trait]
pub trait CompletionHook: Send + Sync {
    async fn after_render(&self) -> Result<(), ViewError>;
}

/// RouteTable
///
/// Mapping from page to view. Built once at startup and moved into the router,
/// which only ever reads it.
#[derive(Default)]
pub struct RouteTable {
    views: HashMap<PageId, Arc<dyn View>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `view` for `page`, replacing any earlier registration.
    pub fn with(mut self, page: PageId, view: Arc<dyn View>) -> Self {
        tracing::debug!(%page, "Route registered");
        self.views.insert(page, view);
        self
    }

    pub fn get(&self, page: PageId) -> Option<&Arc<dyn View>> {
        self.views.get(&page)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// card_routes
    ///
    /// The full card: one view per page, sharing the asset loader and display.
    pub fn card_routes(assets: AssetState, display: DisplayState) -> Self {
        Self::new()
            .with(
                PageId::Home,
                Arc::new(open::HomeView::new(assets.clone(), display.clone())),
            )
            .with(PageId::Gate, Arc::new(open::GateView))
            .with(
                PageId::Unlocked1,
                Arc::new(gated::GiftView::new(assets.clone(), display.clone())),
            )
            .with(PageId::Unlocked2, Arc::new(gated::MenuView))
            .with(
                PageId::Unlocked3,
                Arc::new(gated::EnvelopeView::new(assets, display)),
            )
            .with(PageId::Final, Arc::new(gated::LetterView))
    }
}

/// show_image
///
/// Shared post-render step of the image pages: resolve the asset (never fails,
/// falls back) and point the page's image element at it.
pub(crate) async fn show_image(
    assets: &AssetState,
    display: &DisplayState,
    asset: ImageAsset,
    element_id: &str,
) {
    let source = assets.load_image(asset).await;
    display.set_image(element_id, &source);
}

// --- Static fallback pages ---

/// error_page
///
/// Shown when navigation cannot recover by redirecting home. Static text only,
/// never the underlying error.
pub fn error_page() -> Markup {
    concat!(
        r#"<div class="page"><h1>⚠️ Something Went Wrong</h1>"#,
        "<p>Navigation failed. Please refresh the page.</p>",
        r#"<button class="btn" data-action="reload">Refresh Page</button></div>"#
    )
    .to_string()
}

/// init_failure_page
///
/// Shown when the card cannot start at all.
pub fn init_failure_page() -> Markup {
    concat!(
        r#"<div class="page"><h1>⚠️ Oops!</h1>"#,
        "<p>Something went wrong while loading your birthday surprise.</p>",
        "<p>Please refresh the page to try again.</p>",
        r#"<button class="btn" data-action="reload">Refresh Page</button></div>"#
    )
    .to_string()
}
