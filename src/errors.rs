//! # Card Errors
//!
//! Error types for every concern of the card. None of these messages is ever
//! shown verbatim to the person opening the card: the router and the
//! application controller swap them for the static pages `routes::error_page`
//! and `routes::init_failure_page`.

use crate::models::PageId;
use thiserror::Error;

/// Code entry failures. User-correctable, shown inline on the gate page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input is not exactly four decimal digits.
    #[error("Enter your birthday as four digits (day then month)")]
    Format,

    /// Well-formed input that is not the accepted code.
    #[error("That is not the right birthday, try again")]
    Mismatch,
}

/// Failures the router recovers from by redirecting to the home page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The route table has no view for an approved page.
    #[error("No view registered for page '{0}'")]
    NoView(PageId),

    /// The view's markup could not be committed.
    #[error("Rendering page '{page}' failed: {source}")]
    Render {
        page: PageId,
        #[source]
        source: DisplayError,
    },
}

/// Failure raised by a view's post-render completion hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("View setup for '{page}' failed: {reason}")]
pub struct ViewError {
    pub page: PageId,
    pub reason: String,
}

impl ViewError {
    pub fn new(page: PageId, reason: impl Into<String>) -> Self {
        Self {
            page,
            reason: reason.into(),
        }
    }
}

/// Image resolution failures. Internal to the asset loader, always replaced by
/// a fallback image before anything leaves it.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset file {path} is unreadable: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset file {path} is empty")]
    Empty { path: String },
}

/// Key-value persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("State file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Simulated failure from the in-memory store.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// The single managed display region is not available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("Display region is detached")]
    Detached,

    #[error("Display write failed: {0}")]
    Write(String),
}

/// Audio backend failures. Logged only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Audio playback failed for {track}: {reason}")]
pub struct AudioError {
    pub track: String,
    pub reason: String,
}

/// Startup failures before the router exists. Surfaced as the full-page
/// fallback with a reload action.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Environment variable {0} is required")]
    MissingVar(&'static str),

    #[error("Environment variable {name} is invalid: {value}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Loading the saved card state failed: {0}")]
    Store(#[from] StoreError),
}
