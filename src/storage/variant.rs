//! On-demand resized variants of an item's original image.
//!
//! A variant lives next to the original as `thumb_<height>x<width>`, keyed by
//! the dimensions exactly as requested. Once written it is served as is;
//! replacing the original wipes the directory and with it every variant.
//!
//! Two readers missing on the same key both render it. Output is
//! deterministic and each write lands through a rename, so the loser simply
//! replaces an identical file.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use super::format::ImageKind;
use crate::error::{AppError, AppResult};

pub const ORIGINAL_FILE: &str = "original";

/// Upper bound for either requested dimension.
pub const MAX_VARIANT_DIMENSION: u32 = 8192;

const JPEG_QUALITY: u8 = 75;

pub fn variant_file_name(height: u32, width: u32) -> String {
    format!("thumb_{}x{}", height, width)
}

#[derive(Debug, Default)]
pub struct VariantCache {
    generated: AtomicU64,
}

impl VariantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variants rendered and written since construction. Cache hits do not count.
    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    /// Returns the path of the `height` x `width` variant inside `dir`,
    /// rendering it from `original` on a miss. `0 x 0` selects the original.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn get_or_create_variant(
        &self,
        dir: &Path,
        height: u32,
        width: u32,
    ) -> AppResult<PathBuf> {
        let original = dir.join(ORIGINAL_FILE);

        if height == 0 && width == 0 {
            if !fs::try_exists(&original).await? {
                return Err(AppError::NotFound(format!("{}", original.display())));
            }
            return Ok(original);
        }

        let target = dir.join(variant_file_name(height, width));
        if fs::try_exists(&target).await? {
            tracing::debug!("variant cache hit: {}", target.display());
            return Ok(target);
        }

        let source = fs::read(&original).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("{}", original.display()))
            } else {
                AppError::Io(e)
            }
        })?;

        let rendered = tokio::task::spawn_blocking(move || render_variant(&source, height, width))
            .await
            .map_err(|e| AppError::Internal(format!("variant task failed: {}", e)))??;

        write_atomic(&target, &rendered).await?;
        self.generated.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            "Variant generated: path={}, size={}",
            target.display(),
            rendered.len()
        );
        Ok(target)
    }
}

/// Decodes `source`, fits it inside `width` x `height` and re-encodes it in
/// the source format.
pub fn render_variant(source: &[u8], height: u32, width: u32) -> AppResult<Vec<u8>> {
    let kind = ImageKind::sniff(source)?;
    let image = image::load_from_memory_with_format(source, kind.format())
        .map_err(|e| AppError::CorruptImage(e.to_string()))?;

    encode(fit_within(image, height, width), kind)
}

/// Thumbnail fit: keep the aspect ratio, stay inside the box, never upsample.
/// A zero bound leaves that axis unconstrained.
fn fit_within(image: DynamicImage, height: u32, width: u32) -> DynamicImage {
    let max_width = if width == 0 { image.width() } else { width };
    let max_height = if height == 0 { image.height() } else { height };

    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }
    image.resize(max_width, max_height, FilterType::Lanczos3)
}

fn encode(image: DynamicImage, kind: ImageKind) -> AppResult<Vec<u8>> {
    match kind {
        ImageKind::Png => {
            let mut cursor = Cursor::new(Vec::new());
            image
                .write_to(&mut cursor, kind.format())
                .map_err(|e| AppError::Internal(format!("png encode failed: {}", e)))?;
            Ok(cursor.into_inner())
        }
        ImageKind::Jpeg => {
            // JPEG has no alpha channel.
            let image = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            let mut buf = Vec::new();
            image
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))
                .map_err(|e| AppError::Internal(format!("jpeg encode failed: {}", e)))?;
            Ok(buf)
        }
    }
}

/// Writes to a uniquely named sibling, fsyncs, then renames over `path`, so
/// readers see either no file or the complete one.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> AppResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp.{}", file_name, Uuid::new_v4()));

    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(AppError::Io(e));
    }
    Ok(())
}
