use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

// --- Module Structure ---

// Core card services and components.
pub mod assets;
pub mod audio;
pub mod auth;
pub mod config;
pub mod display;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod storage;

// Views, segregated by access level (open, gated).
pub mod routes;

use assets::AssetState;
use audio::{AudioOutput, BackgroundMusic, MusicHandle};
use auth::AccessGate;
use display::{DisplayState, LocationState};
use errors::InitError;
use models::{AppStatus, CardAction, PageId};
use router::{NavigationOutcome, Router};
use routes::RouteTable;
use storage::StoreState;

// --- Public Re-exports ---

// Makes the startup types easily accessible to the binary entry point (main.rs).
pub use config::AppConfig;
pub use handlers::ActionOutcome;
pub use storage::{FileStore, MemoryStore};

/// CardServices
///
/// The collaborators a host hands to the card at startup. Everything behind a
/// trait object, so the binary, the tests and any other host pick their own.
pub struct CardServices {
    /// Persisted key-value state (local storage).
    pub store: StoreState,
    /// Image resolution with fallbacks.
    pub assets: AssetState,
    /// Audio playback backend.
    pub audio: Arc<dyn AudioOutput>,
    /// The single managed display region.
    pub display: DisplayState,
    /// The location fragment.
    pub location: LocationState,
}

/// CardApp
///
/// The single container holding every long-lived object of the card. Built once
/// by [`CardApp::initialize`] and passed by reference (or cheap clone) to
/// whatever needs it; there are no globals.
#[derive(Clone)]
pub struct CardApp {
    /// Configuration: the loaded, immutable settings.
    pub config: AppConfig,
    /// Access state and its persistence.
    pub access: Arc<AccessGate>,
    /// Navigation state machine.
    pub router: Arc<Router>,
    pub assets: AssetState,
    pub music: MusicHandle,
    pub display: DisplayState,
    pub location: LocationState,
}

impl CardApp {
    /// initialize
    ///
    /// Startup sequence: restore the access state, warm the image cache, register
    /// every view and build the router. Image problems never fail startup (they
    /// fall back); only an unreadable state store does.
    pub async fn initialize(config: AppConfig, services: CardServices) -> Result<Self, InitError> {
        tracing::info!(env = ?config.env, "Birthday card initializing");

        // 1. Access state (persisted flag).
        let access = Arc::new(AccessGate::load(services.store).await?);

        // 2. Images: preload, then report what fell back.
        services.assets.preload_all().await;
        let report = services.assets.validate().await;
        if !report.using_fallbacks.is_empty() {
            tracing::info!(using_fallbacks = ?report.using_fallbacks, "Using fallback images");
        }

        // 3. Route table and router.
        let routes = RouteTable::card_routes(services.assets.clone(), services.display.clone());
        tracing::info!(routes = routes.len(), "Route table ready");
        let router = Arc::new(Router::new(
            routes,
            access.clone(),
            services.display.clone(),
            services.location.clone(),
        ));

        // 4. Music manager.
        let music = Arc::new(BackgroundMusic::new(services.audio, config.audio_dir.clone()));

        log_navigation_flow();
        tracing::info!(accepted = access.is_accepted(), "Birthday card initialized");

        Ok(Self {
            config,
            access,
            router,
            assets: services.assets,
            music,
            display: services.display,
            location: services.location,
        })
    }

    /// start
    ///
    /// The initial-load notification: renders whatever the location currently
    /// names, through the same guard as every hashchange.
    pub async fn start(&self) -> NavigationOutcome {
        let hash = self.location.hash();
        self.router.hash_observed(hash.as_deref()).await
    }

    /// Handles one user interaction. See [`handlers::perform`].
    pub async fn perform(&self, action: CardAction) -> ActionOutcome {
        handlers::perform(self, action).await
    }

    /// reset
    ///
    /// Forgets the accepted code, empties the image cache and returns home, after
    /// which gated pages are denied again.
    pub async fn reset(&self) -> NavigationOutcome {
        if let Err(e) = self.access.reset().await {
            tracing::warn!(error = %e, "Saved access flag could not be removed");
        }
        self.assets.clear_cache();
        let outcome = self.router.navigate(PageId::Home).await;
        tracing::info!("Card reset complete");
        outcome
    }

    pub fn status(&self) -> AppStatus {
        let session = self.router.session();
        AppStatus {
            current_page: session.current_page,
            accepted: self.access.is_accepted(),
            transitioning: session.transitioning,
            assets_cached: self.assets.cached_count(),
        }
    }

    /// run
    ///
    /// The event loop. Every hashchange and every action runs as its own task on
    /// the (current-thread) runtime, so an event that arrives while a view's
    /// completion hook is pending reaches the router's guard and is dropped, the
    /// same way a browser delivers events during an awaited setup. Returns once
    /// the action channel is closed.
    pub async fn run(
        &self,
        mut hash_events: UnboundedReceiver<String>,
        mut actions: UnboundedReceiver<CardAction>,
    ) {
        loop {
            tokio::select! {
                Some(fragment) = hash_events.recv() => {
                    let app = self.clone();
                    tokio::spawn(async move {
                        let raw = (!fragment.is_empty()).then_some(fragment.as_str());
                        let outcome = app.router.hash_observed(raw).await;
                        tracing::debug!(?outcome, "Hash change handled");
                    });
                }
                action = actions.recv() => {
                    let Some(action) = action else {
                        break;
                    };
                    let app = self.clone();
                    tokio::spawn(async move {
                        let outcome = app.perform(action).await;
                        tracing::debug!(?outcome, "Action handled");
                    });
                }
            }
        }
        tracing::info!("Event loop stopped");
    }
}

/// log_navigation_flow
///
/// Logs the page chain once at startup.
fn log_navigation_flow() {
    let mut chain = Vec::new();
    let mut page = Some(PageId::Home);
    while let Some(current) = page {
        chain.push(current.as_str());
        page = current.next();
    }
    tracing::info!(
        pages = chain.len(),
        flow = %chain.join(" → "),
        "Navigation flow configured"
    );
}
