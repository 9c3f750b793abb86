use super::{CompletionHook, Markup, View, show_image};
use crate::{
    assets::{AssetState, ImageAsset},
    display::DisplayState,
    errors::ViewError,
};
use async_trait::async_trait;

/// GiftView
///
/// First unlocked page: the gift box and the button to receive it.
pub struct GiftView {
    assets: AssetState,
    display: DisplayState,
}

impl GiftView {
    pub fn new(assets: AssetState, display: DisplayState) -> Self {
        Self { assets, display }
    }
}

impl View for GiftView {
    fn render(&self) -> Markup {
        concat!(
            r#"<div class="page gift-page"><div class="gift-content">"#,
            r#"<img src="" alt="Gift Box" class="gift-image" id="gift-box">"#,
            r#"<p class="gift-message">A present for someone lovely</p>"#,
            r#"<button class="btn gift-btn" id="receive-gift-btn">Receive gift</button>"#,
            "</div></div>"
        )
        .to_string()
    }

    fn completion(&self) -> Option<&dyn CompletionHook> {
        Some(self)
    }
}

#[async_trait]
impl CompletionHook for GiftView {
    async fn after_render(&self) -> Result<(), ViewError> {
        show_image(&self.assets, &self.display, ImageAsset::GiftBox, "gift-box").await;
        Ok(())
    }
}

/// MenuView
pub struct MenuView;

impl View for MenuView {
    fn render(&self) -> Markup {
        concat!(
            r#"<div class="page"><h1>Menu</h1><p>Pick your birthday present</p>"#,
            r#"<div class="card birthday-letter-card" id="birthday-letter-card">"#,
            "<h2>💌 A letter for someone sweet</h2>",
            "<p>A special birthday letter just for you</p>",
            "</div></div>"
        )
        .to_string()
    }
}

/// EnvelopeView
///
/// The sealed letter. Its button also switches the background track, which the
/// `Continue` action handler schedules.
pub struct EnvelopeView {
    assets: AssetState,
    display: DisplayState,
}

impl EnvelopeView {
    pub fn new(assets: AssetState, display: DisplayState) -> Self {
        Self { assets, display }
    }
}

impl View for EnvelopeView {
    fn render(&self) -> Markup {
        concat!(
            r#"<div class="page envelope-page"><div class="envelope-content">"#,
            r#"<img src="" alt="Envelope" class="envelope-img" id="envelope">"#,
            r#"<p class="envelope-message">Happy Birthday To You</p>"#,
            r#"<button class="btn envelope-btn" id="open-letter-btn">Read it</button>"#,
            "</div></div>"
        )
        .to_string()
    }

    fn completion(&self) -> Option<&dyn CompletionHook> {
        Some(self)
    }
}

#[async_trait]
impl CompletionHook for EnvelopeView {
    async fn after_render(&self) -> Result<(), ViewError> {
        show_image(&self.assets, &self.display, ImageAsset::Envelope, "envelope").await;
        Ok(())
    }
}

/// LetterView
///
/// The final page.
pub struct LetterView;

impl View for LetterView {
    fn render(&self) -> Markup {
        concat!(
            r#"<div class="page letter-page">"#,
            r#"<h1 class="letter-title">🎉 Happy Birthday To You 🎉</h1>"#,
            r#"<div class="letter-body"><p>Dear birthday star,</p>"#,
            "<p>Happy birthday, this year and every year. I am always cheering for you. ",
            "May the world be as kind to you as you are to everyone else. ",
            "Smile a lot and take care of yourself. 🎂🎉</p></div>",
            r#"<p class="letter-footer">🎈 Hope your day is as happy as you make everyone else's. 🎈</p>"#,
            "</div>"
        )
        .to_string()
    }

    fn completion(&self) -> Option<&dyn CompletionHook> {
        Some(self)
    }
}

#[async_trait]
impl CompletionHook for LetterView {
    async fn after_render(&self) -> Result<(), ViewError> {
        tracing::info!("Birthday letter displayed");
        Ok(())
    }
}
