use super::{CompletionHook, Markup, View, show_image};
use crate::{
    assets::{AssetState, ImageAsset},
    display::DisplayState,
    errors::ViewError,
};
use async_trait::async_trait;

/// HomeView
///
/// First page: the cake and the button that opens the card. The cake image is
/// resolved after the markup is on screen.
pub struct HomeView {
    assets: AssetState,
    display: DisplayState,
}

impl HomeView {
    pub fn new(assets: AssetState, display: DisplayState) -> Self {
        Self { assets, display }
    }
}

impl View for HomeView {
    fn render(&self) -> Markup {
        concat!(
            r#"<div class="page home-page"><div class="home-content">"#,
            r#"<img src="" alt="Birthday Cake" class="home-image" id="birthday-cake">"#,
            r#"<p class="home-message">Your present has arrived!</p>"#,
            r#"<button class="btn home-btn" id="wishes-btn">Open</button>"#,
            "</div></div>"
        )
        .to_string()
    }

    fn completion(&self) -> Option<&dyn CompletionHook> {
        Some(self)
    }
}

#[async_trait]
impl CompletionHook for HomeView {
    async fn after_render(&self) -> Result<(), ViewError> {
        show_image(&self.assets, &self.display, ImageAsset::Cake, "birthday-cake").await;
        Ok(())
    }
}

/// GateView
///
/// Code entry: four single-digit inputs, an inline error slot and a submit
/// button. Submission is handled by the `SubmitCode` action, so the page has no
/// post-render setup.
pub struct GateView;

impl View for GateView {
    fn render(&self) -> Markup {
        let inputs: String = (1..=4)
            .map(|i| {
                format!(
                    r#"<input type="text" class="pin-digit" id="pin-{i}" maxlength="1" inputmode="numeric" pattern="[0-9]">"#
                )
            })
            .collect();

        format!(
            concat!(
                r#"<div class="page pin-page"><div class="pin-container"><div class="pin-box">"#,
                r#"<h2 class="pin-title">Enter your birthday</h2>"#,
                r#"<p class="pin-hint">Hint: day / month</p>"#,
                r#"<div class="pin-inputs">{}</div></div>"#,
                r#"<div id="pin-error" class="error-message hidden"></div>"#,
                r#"<button class="btn pin-btn" id="pin-submit-btn">Confirm</button>"#,
                "</div></div>"
            ),
            inputs
        )
    }
}
