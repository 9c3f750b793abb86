use crate::{
    CardApp,
    audio::Track,
    auth,
    errors::ValidationError,
    models::{CardAction, PageId},
    router::NavigationOutcome,
};

/// ActionOutcome
///
/// What a user interaction ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The action led to a navigation event.
    Navigated(NavigationOutcome),
    /// The code entry was refused; the message is shown inline on the gate page.
    Rejected(ValidationError),
    /// Music was started or paused.
    MusicToggled { playing: bool },
    /// The action is not available on the current page.
    Ignored,
}

// --- Handlers ---

/// perform
///
/// Dispatches one interaction against the page currently on screen. This is the
/// equivalent of the click and submit listeners each page attaches after it is
/// rendered, so an action that the current page does not offer is ignored.
pub async fn perform(app: &CardApp, action: CardAction) -> ActionOutcome {
    let page = app.router.current_page();
    tracing::debug!(?action, ?page, "Action received");

    match action {
        CardAction::Continue => continue_from(app, page).await,
        CardAction::SubmitCode(input) => submit_code(app, page, &input).await,
        CardAction::ToggleMusic => {
            app.music.toggle().await;
            ActionOutcome::MusicToggled {
                playing: app.music.is_playing(),
            }
        }
        CardAction::Reset => ActionOutcome::Navigated(app.reset().await),
    }
}

/// continue_from
///
/// The main button of every page except the gate and the letter. Moves to the
/// page's successor in the navigation chain, with the page-specific side effects:
/// the home button starts the music, the envelope button schedules the letter
/// track.
async fn continue_from(app: &CardApp, page: Option<PageId>) -> ActionOutcome {
    let Some(page) = page else {
        return ActionOutcome::Ignored;
    };
    let Some(next) = page.next() else {
        return ActionOutcome::Ignored;
    };

    match page {
        PageId::Home => {
            app.music.play(Track::Birthday).await;
        }
        PageId::Unlocked1 | PageId::Unlocked2 => {}
        PageId::Unlocked3 => {
            let music = app.music.clone();
            let delay = app.config.track_switch_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                music.change_track(Track::Letter).await;
            });
        }
        // The gate only moves on through a valid code.
        PageId::Gate | PageId::Final => return ActionOutcome::Ignored,
    }

    ActionOutcome::Navigated(app.router.navigate(next).await)
}

/// submit_code
///
/// Validates the entry, persists the accepted code and moves to the first
/// unlocked page. A refused entry stays on the gate with an inline message.
async fn submit_code(app: &CardApp, page: Option<PageId>, input: &str) -> ActionOutcome {
    if page != Some(PageId::Gate) {
        return ActionOutcome::Ignored;
    }

    let code = match auth::validate(input) {
        Ok(code) => code,
        Err(e) => {
            tracing::info!(reason = ?e, "Code entry refused");
            app.display.show_inline_error(&e.to_string());
            return ActionOutcome::Rejected(e);
        }
    };

    if let Err(e) = app.access.accept(code).await {
        // The session is unlocked regardless; only the next restart will ask again.
        tracing::warn!(error = %e, "Accepted code could not be saved");
    }

    ActionOutcome::Navigated(app.router.navigate(PageId::Unlocked1).await)
}
