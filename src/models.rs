use serde::{Deserialize, Serialize};
use std::fmt;

// --- Core Page Schemas ---

/// PageId
///
/// The closed set of pages making up the card. Each page is addressed by the
/// lowercase fragment of the location (e.g. `#unlocked-2`).
///
/// Invariant: a value of this type is always a member of the set. Anything the
/// location carries that does not match exactly is coerced to `Home` by
/// [`PageId::resolve`] before the router or the policy ever sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageId {
    Home,
    Gate,
    #[serde(rename = "unlocked-1")]
    Unlocked1,
    #[serde(rename = "unlocked-2")]
    Unlocked2,
    #[serde(rename = "unlocked-3")]
    Unlocked3,
    Final,
}

impl PageId {
    /// Every page, in the order of the navigation chain.
    pub const ALL: [PageId; 6] = [
        PageId::Home,
        PageId::Gate,
        PageId::Unlocked1,
        PageId::Unlocked2,
        PageId::Unlocked3,
        PageId::Final,
    ];

    /// as_str
    ///
    /// The fragment form of the page, without the leading `#`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Home => "home",
            PageId::Gate => "gate",
            PageId::Unlocked1 => "unlocked-1",
            PageId::Unlocked2 => "unlocked-2",
            PageId::Unlocked3 => "unlocked-3",
            PageId::Final => "final",
        }
    }

    /// parse
    ///
    /// Exact match of a fragment (with or without its leading `#`) against the set.
    /// Returns `None` for anything unrecognized, including different casing.
    pub fn parse(raw: &str) -> Option<PageId> {
        let fragment = raw.strip_prefix('#').unwrap_or(raw);
        PageId::ALL
            .into_iter()
            .find(|page| page.as_str() == fragment)
    }

    /// resolve
    ///
    /// The coercion applied to every location value: absent, empty or unknown
    /// fragments all map to `Home`.
    pub fn resolve(raw: Option<&str>) -> PageId {
        raw.and_then(PageId::parse).unwrap_or(PageId::Home)
    }

    /// next
    ///
    /// The NavigationEdge chain: each page has at most one successor and `Final`
    /// has none. The router never enforces this order; the action handlers use it
    /// to pick the target of a page's main button.
    pub fn next(&self) -> Option<PageId> {
        match self {
            PageId::Home => Some(PageId::Gate),
            PageId::Gate => Some(PageId::Unlocked1),
            PageId::Unlocked1 => Some(PageId::Unlocked2),
            PageId::Unlocked2 => Some(PageId::Unlocked3),
            PageId::Unlocked3 => Some(PageId::Final),
            PageId::Final => None,
        }
    }

    /// Pages reachable without the accepted code.
    pub fn is_open(&self) -> bool {
        matches!(self, PageId::Home | PageId::Gate)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Access Schemas ---

/// AccessState
///
/// Whether the gating code has been accepted in this installation.
///
/// Invariant: `code` is present if and only if `accepted` is true. The fields are
/// private so the only ways to build a value are [`AccessState::locked`] and
/// [`AccessState::unlocked`], which uphold it by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AccessState {
    accepted: bool,
    code: Option<String>,
}

impl AccessState {
    pub fn locked() -> Self {
        Self {
            accepted: false,
            code: None,
        }
    }

    pub fn unlocked(code: impl Into<String>) -> Self {
        Self {
            accepted: true,
            code: Some(code.into()),
        }
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

// --- Router Schemas ---

/// RouterSession
///
/// Snapshot of the router's transient state. `current_page` is `None` until the
/// first view has been committed to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RouterSession {
    pub current_page: Option<PageId>,
    pub transitioning: bool,
}

// --- Interaction Schemas ---

/// CardAction
///
/// The user interactions a page can receive. These stand in for the click and
/// submit handlers each page wires up after it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// The page's main button: move on to the next page of the chain.
    Continue,
    /// Submit the 4-digit code typed on the gate page.
    SubmitCode(String),
    /// Start or pause the background music.
    ToggleMusic,
    /// Forget the accepted code and go back to the first page.
    Reset,
}

// --- Status Schemas (Output) ---

/// AppStatus
///
/// Diagnostic overview of the running card, printed by the `status` command.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AppStatus {
    pub current_page: Option<PageId>,
    pub accepted: bool,
    pub transitioning: bool,
    /// Number of images resolved so far (real asset or fallback).
    pub assets_cached: usize,
}
