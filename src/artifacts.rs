use std::{io::Cursor, path::PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::{foundation::error::ThumbResult, pipeline::Composite};

pub const WALLPAPER_FILE: &str = "wallpaper.png";
pub const THUMBNAIL_FILE: &str = "thumbnail.png";
pub const PHOTO_FILE: &str = "photo.png";
pub const FINAL_FILE: &str = "final.png";
/// File name the composed image is offered under for download.
pub const DOWNLOAD_FILE_NAME: &str = "thumbnail_image.png";

/// Paths written by one [`ArtifactWriter::write`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub wallpaper: PathBuf,
    pub thumbnail: PathBuf,
    pub photo: Option<PathBuf>,
    pub final_image: Option<PathBuf>,
}

/// Persists stage images as PNG files under one directory.
#[derive(Clone, Debug)]
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write every stage of `composite`. Photo artifacts left over from an
    /// earlier pass are removed when this pass had no photo.
    pub fn write(&self, composite: &Composite) -> ThumbResult<WrittenArtifacts> {
        std::fs::create_dir_all(&self.out_dir).with_context(|| {
            format!("create output dir '{}'", self.out_dir.display())
        })?;

        let wallpaper = self.save(WALLPAPER_FILE, &composite.wallpaper)?;
        let thumbnail = self.save(THUMBNAIL_FILE, &composite.thumbnail)?;

        let photo = match &composite.photo {
            Some(img) => Some(self.save(PHOTO_FILE, img)?),
            None => {
                self.remove_stale(PHOTO_FILE);
                None
            }
        };
        let final_image = match &composite.final_image {
            Some(img) => Some(self.save(FINAL_FILE, img)?),
            None => {
                self.remove_stale(FINAL_FILE);
                None
            }
        };

        Ok(WrittenArtifacts {
            wallpaper,
            thumbnail,
            photo,
            final_image,
        })
    }

    fn save(&self, name: &str, img: &RgbaImage) -> ThumbResult<PathBuf> {
        let path = self.out_dir.join(name);
        img.save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        tracing::info!(path = %path.display(), width = img.width(), height = img.height(), "wrote artifact");
        Ok(path)
    }

    fn remove_stale(&self, name: &str) {
        let path = self.out_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed stale artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove stale artifact")
            }
        }
    }
}

/// PNG-encode an image in memory.
pub fn encode_png(img: &RgbaImage) -> ThumbResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Bytes of the download artifact for a finished pass.
pub fn download_bytes(composite: &Composite) -> ThumbResult<Vec<u8>> {
    encode_png(composite.output())
}
