use std::path::Path;
use std::sync::Arc;
use surprise_card::assets::{AssetLoader, FileAssetLoader, ImageAsset, ImageSource};

// --- Test Utilities ---

fn write_asset(dir: &Path, asset: ImageAsset, bytes: &[u8]) {
    std::fs::write(dir.join(asset.file_name()), bytes).unwrap();
}

// --- Tests ---

#[tokio::test]
async fn test_existing_file_resolves_to_its_path() {
    let dir = tempfile::tempdir().unwrap();
    write_asset(dir.path(), ImageAsset::Cake, b"png");
    let loader = FileAssetLoader::new(dir.path());

    let source = loader.load_image(ImageAsset::Cake).await;

    assert!(!source.is_fallback());
    assert!(source.as_str().ends_with("birthday-cake.png"));
}

#[tokio::test]
async fn test_missing_and_empty_files_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    write_asset(dir.path(), ImageAsset::Envelope, b"");
    let loader = FileAssetLoader::new(dir.path());

    let missing = loader.load_image(ImageAsset::GiftBox).await;
    let empty = loader.load_image(ImageAsset::Envelope).await;

    assert_eq!(missing, ImageSource::Fallback(ImageAsset::GiftBox.fallback_uri()));
    assert_eq!(empty, ImageSource::Fallback(ImageAsset::Envelope.fallback_uri()));
}

#[test]
fn test_fallbacks_are_distinct_svg_data_uris() {
    let uris: Vec<String> = ImageAsset::ALL.iter().map(ImageAsset::fallback_uri).collect();

    for uri in &uris {
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }
    assert_ne!(uris[0], uris[1]);
    assert_ne!(uris[1], uris[2]);
}

#[tokio::test]
async fn test_results_are_cached_until_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileAssetLoader::new(dir.path());

    assert!(loader.load_image(ImageAsset::Cake).await.is_fallback());
    assert_eq!(loader.cached_count(), 1);

    // The file shows up later: the cached fallback still wins.
    write_asset(dir.path(), ImageAsset::Cake, b"png");
    assert!(loader.load_image(ImageAsset::Cake).await.is_fallback());

    loader.clear_cache();
    assert_eq!(loader.cached_count(), 0);
    assert!(!loader.load_image(ImageAsset::Cake).await.is_fallback());
}

#[tokio::test]
async fn test_concurrent_loads_agree() {
    let dir = tempfile::tempdir().unwrap();
    write_asset(dir.path(), ImageAsset::GiftBox, b"png");
    let loader = Arc::new(FileAssetLoader::new(dir.path()));

    let (a, b) = tokio::join!(
        loader.load_image(ImageAsset::GiftBox),
        loader.load_image(ImageAsset::GiftBox)
    );

    assert_eq!(a, b);
    assert_eq!(loader.cached_count(), 1);
}

#[tokio::test]
async fn test_preload_and_validate_report() {
    let dir = tempfile::tempdir().unwrap();
    write_asset(dir.path(), ImageAsset::Cake, b"png");
    let loader = FileAssetLoader::new(dir.path());

    let preloaded = loader.preload_all().await;
    assert_eq!(preloaded.len(), 3);
    assert_eq!(loader.cached_count(), 3);

    let report = loader.validate().await;
    assert_eq!(report.available, vec![ImageAsset::Cake]);
    assert_eq!(
        report.using_fallbacks,
        vec![ImageAsset::GiftBox, ImageAsset::Envelope]
    );
}
