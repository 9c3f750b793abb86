//! The two surfaces the router writes to: the single managed display region
//! and the location fragment.

use crate::{assets::ImageSource, errors::DisplayError, models::PageId};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

// --- Display Region ---

/// DisplayRegion
///
/// The one region of the screen the card owns. `commit` replaces its entire
/// contents; the other two calls patch the committed markup in place.
pub trait DisplayRegion: Send + Sync {
    fn commit(&self, markup: &str) -> Result<(), DisplayError>;

    /// Points the image element `element_id` at `source`.
    fn set_image(&self, element_id: &str, source: &ImageSource);

    /// Shows a user-correctable message in the page's inline error slot.
    fn show_inline_error(&self, message: &str);
}

#[derive(Default)]
struct Recorded {
    commits: Vec<String>,
    images: HashMap<String, ImageSource>,
    inline_error: Option<String>,
}

/// MemoryDisplay
///
/// Records everything written to it. Used by tests and headless hosts.
#[derive(Default)]
pub struct MemoryDisplay {
    recorded: Mutex<Recorded>,
    detached: bool,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A display whose region is missing: every commit fails.
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Markup currently shown.
    pub fn current(&self) -> Option<String> {
        self.recorded().commits.last().cloned()
    }

    /// Number of commits so far.
    pub fn commit_count(&self) -> usize {
        self.recorded().commits.len()
    }

    pub fn image(&self, element_id: &str) -> Option<ImageSource> {
        self.recorded().images.get(element_id).cloned()
    }

    pub fn inline_error(&self) -> Option<String> {
        self.recorded().inline_error.clone()
    }
}

impl DisplayRegion for MemoryDisplay {
    fn commit(&self, markup: &str) -> Result<(), DisplayError> {
        if self.detached {
            return Err(DisplayError::Detached);
        }
        let mut recorded = self.recorded();
        recorded.commits.push(markup.to_string());
        recorded.images.clear();
        recorded.inline_error = None;
        Ok(())
    }

    fn set_image(&self, element_id: &str, source: &ImageSource) {
        self.recorded()
            .images
            .insert(element_id.to_string(), source.clone());
    }

    fn show_inline_error(&self, message: &str) {
        self.recorded().inline_error = Some(message.to_string());
    }
}

/// TerminalDisplay
///
/// Prints the region to stdout, one framed block per commit. Logs go to stderr,
/// so the two never interleave on the same stream.
#[derive(Default)]
pub struct TerminalDisplay;

impl DisplayRegion for TerminalDisplay {
    fn commit(&self, markup: &str) -> Result<(), DisplayError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "\n----------------------------------------\n{markup}")
            .and_then(|_| out.flush())
            .map_err(|e| DisplayError::Write(e.to_string()))
    }

    fn set_image(&self, element_id: &str, source: &ImageSource) {
        let shown = if source.is_fallback() {
            "(placeholder)"
        } else {
            source.as_str()
        };
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "  [{element_id}] {shown}") {
            tracing::debug!(error = %e, element_id, "Image line could not be written");
        }
    }

    fn show_inline_error(&self, message: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "  ! {message}") {
            tracing::debug!(error = %e, "Inline error could not be written");
        }
    }
}

/// DisplayState
///
/// The concrete type used to share the display region.
pub type DisplayState = Arc<dyn DisplayRegion>;

// --- Location ---

/// Location
///
/// The fragment part of the address. It is the source of truth for the last
/// requested page: the router writes approved targets and redirects into it.
pub trait Location: Send + Sync {
    /// Current fragment without the leading `#`, `None` when empty.
    fn hash(&self) -> Option<String>;

    fn set_hash(&self, page: PageId);
}

/// HashLocation
///
/// In-process location. When built with a notifier it behaves like a browser
/// address bar: every change of value emits one hashchange notification carrying
/// the new fragment. Writing the value it already holds emits nothing.
#[derive(Default)]
pub struct HashLocation {
    fragment: Mutex<Option<String>>,
    notifier: Option<UnboundedSender<String>>,
}

impl HashLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(notifier: UnboundedSender<String>) -> Self {
        Self {
            fragment: Mutex::new(None),
            notifier: Some(notifier),
        }
    }

    /// enter
    ///
    /// Host-side edit of the address (the user typing a fragment). Accepts the
    /// fragment with or without `#`, verbatim: resolution happens in the router.
    pub fn enter(&self, raw: &str) {
        let fragment = raw.trim().trim_start_matches('#');
        self.replace(if fragment.is_empty() {
            None
        } else {
            Some(fragment.to_string())
        });
    }

    fn replace(&self, next: Option<String>) {
        let changed = {
            let mut current = self.fragment.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        };

        if changed {
            if let Some(notifier) = &self.notifier {
                // A closed channel means the event loop is gone; nothing left to notify.
                let _ = notifier.send(next.unwrap_or_default());
            }
        }
    }
}

impl Location for HashLocation {
    fn hash(&self) -> Option<String> {
        self.fragment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_hash(&self, page: PageId) {
        self.replace(Some(page.as_str().to_string()));
    }
}

/// LocationState
///
/// The concrete type used to share the location.
pub type LocationState = Arc<dyn Location>;
