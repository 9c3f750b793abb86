use crate::errors::AssetError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// ImageAsset
///
/// The closed set of images the card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageAsset {
    Cake,
    GiftBox,
    Envelope,
}

impl ImageAsset {
    pub const ALL: [ImageAsset; 3] = [ImageAsset::Cake, ImageAsset::GiftBox, ImageAsset::Envelope];

    /// File name under the configured asset directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ImageAsset::Cake => "birthday-cake.png",
            ImageAsset::GiftBox => "gift-box.png",
            ImageAsset::Envelope => "envelope.png",
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            ImageAsset::Cake => "🎂",
            ImageAsset::GiftBox => "🎁",
            ImageAsset::Envelope => "💌",
        }
    }

    /// fallback_uri
    ///
    /// Inline SVG placeholder (pink square with the matching emoji) used whenever
    /// the real file cannot be resolved.
    pub fn fallback_uri(&self) -> String {
        let svg = format!(
            concat!(
                r#"<svg width="200" height="200" xmlns="http://www.w3.org/2000/svg">"#,
                r##"<rect width="100%" height="100%" fill="#ffb3d9"/>"##,
                r#"<text x="50%" y="50%" font-family="Arial" font-size="48" "#,
                r#"text-anchor="middle" dy=".3em">{}</text></svg>"#
            ),
            self.emoji()
        );
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
    }
}

/// ImageSource
///
/// What an image element should point at once loading has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Path of the real file.
    Asset(String),
    /// Inline placeholder substituted after a failed load.
    Fallback(String),
}

impl ImageSource {
    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Asset(src) | ImageSource::Fallback(src) => src,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ImageSource::Fallback(_))
    }
}

/// AssetReport
///
/// Result of checking every image at startup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetReport {
    pub available: Vec<ImageAsset>,
    pub using_fallbacks: Vec<ImageAsset>,
}

// 1. AssetLoader Contract
/// AssetLoader
///
/// Contract consumed by the views. `load_image` never fails: every failure is
/// logged and resolved to the image's fallback.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load_image(&self, asset: ImageAsset) -> ImageSource;

    /// Drops every resolved image so the next load probes again.
    fn clear_cache(&self);

    /// Number of images resolved so far.
    fn cached_count(&self) -> usize;

    /// preload_all
    ///
    /// Resolves every image concurrently.
    async fn preload_all(&self) -> HashMap<ImageAsset, ImageSource> {
        tracing::info!("Preloading all images");
        let (cake, gift_box, envelope) = tokio::join!(
            self.load_image(ImageAsset::Cake),
            self.load_image(ImageAsset::GiftBox),
            self.load_image(ImageAsset::Envelope),
        );
        HashMap::from([
            (ImageAsset::Cake, cake),
            (ImageAsset::GiftBox, gift_box),
            (ImageAsset::Envelope, envelope),
        ])
    }

    /// validate
    ///
    /// Splits the image set into the ones served from disk and the ones that fell
    /// back to a placeholder.
    async fn validate(&self) -> AssetReport {
        let mut report = AssetReport::default();
        for asset in ImageAsset::ALL {
            if self.load_image(asset).await.is_fallback() {
                report.using_fallbacks.push(asset);
            } else {
                report.available.push(asset);
            }
        }
        tracing::info!(
            available = report.available.len(),
            using_fallbacks = report.using_fallbacks.len(),
            "Asset validation finished"
        );
        report
    }
}

// 2. The Real Implementation (local directory)
/// FileAssetLoader
///
/// Resolves images against a directory. A file that is missing, unreadable or
/// empty resolves to the fallback. Each image is resolved at most once per cache
/// generation; concurrent loads of the same image wait on the same cell.
pub struct FileAssetLoader {
    root: PathBuf,
    cache: Mutex<HashMap<ImageAsset, Arc<OnceCell<ImageSource>>>>,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn probe(&self, asset: ImageAsset) -> Result<String, AssetError> {
        let path = self.root.join(asset.file_name());
        let display = path.display().to_string();

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|source| AssetError::Unreadable {
                path: display.clone(),
                source,
            })?;

        if !meta.is_file() || meta.len() == 0 {
            return Err(AssetError::Empty { path: display });
        }

        Ok(display)
    }

    async fn resolve(&self, asset: ImageAsset) -> ImageSource {
        match self.probe(asset).await {
            Ok(path) => {
                tracing::debug!(?asset, %path, "Image loaded");
                ImageSource::Asset(path)
            }
            Err(e) => {
                tracing::warn!(?asset, error = %e, "Image failed to load, using fallback");
                ImageSource::Fallback(asset.fallback_uri())
            }
        }
    }
}

#[async_trait]
impl AssetLoader for FileAssetLoader {
    async fn load_image(&self, asset: ImageAsset) -> ImageSource {
        let cell = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(asset)
            .or_default()
            .clone();

        cell.get_or_init(|| self.resolve(asset)).await.clone()
    }

    fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("Image cache cleared");
    }

    fn cached_count(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}

/// AssetState
///
/// The concrete type used to share the asset loader with the views.
pub type AssetState = Arc<dyn AssetLoader>;
