//! Choosing images for profile pictures and listings.
//!
//! Picking is an async call that either yields assets or reports that the
//! user backed out. Callers match on [`PickOutcome`] instead of waiting on
//! a callback.

use std::future::Future;
use std::path::PathBuf;

use souk_transport::ImageAsset;

use crate::MarketError;

/// Where the user wants the picture from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Library,
}

/// The result of a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// One or more images, in the order chosen.
    Picked(Vec<ImageAsset>),
    /// The user dismissed the picker. Not an error.
    Cancelled,
}

impl PickOutcome {
    /// The picked assets, or nothing on cancel.
    pub fn into_assets(self) -> Vec<ImageAsset> {
        match self {
            Self::Picked(assets) => assets,
            Self::Cancelled => Vec::new(),
        }
    }
}

/// A platform image picker.
pub trait ImagePicker: Send + Sync + 'static {
    /// Lets the user choose up to `limit` images.
    fn pick(
        &self,
        source: ImageSource,
        limit: usize,
    ) -> impl Future<Output = Result<PickOutcome, MarketError>> + Send;
}

/// Picks from a fixed list of files. For CLIs and tests, where "the user's
/// choice" comes from arguments.
///
/// Files that don't exist are skipped; none left is a cancel. There is no
/// camera.
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    paths: Vec<PathBuf>,
}

impl FilePicker {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl ImagePicker for FilePicker {
    async fn pick(&self, source: ImageSource, limit: usize) -> Result<PickOutcome, MarketError> {
        if source == ImageSource::Camera {
            return Err(MarketError::Unsupported("camera"));
        }

        let mut assets = Vec::new();
        for path in self.paths.iter().take(limit) {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                tracing::warn!(path = %path.display(), "picked file does not exist, skipping");
                continue;
            }
            assets.push(ImageAsset {
                file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
                content_type: content_type_for(path).map(str::to_owned),
                path: path.clone(),
            });
        }

        if assets.is_empty() {
            Ok(PickOutcome::Cancelled)
        } else {
            Ok(PickOutcome::Picked(assets))
        }
    }
}

/// Guesses an image MIME type from the extension.
fn content_type_for(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
