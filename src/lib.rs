//! Thumbforge composes YouTube thumbnails.
//!
//! One render pass takes an immutable [`ThumbnailConfig`] plus an optional photo and runs:
//!
//! - a two-color wallpaper ([`BackgroundRenderer`])
//! - two title lines with optional black boxes
//! - an alpha-masked logo
//! - a background-removed photo ([`BackgroundRemover`]) pasted on top
//!
//! Stages hand images to each other in memory; [`ArtifactWriter`] persists them as PNG.
#![forbid(unsafe_code)]

pub mod artifacts;
pub mod color;
pub mod composite;
pub mod config;
mod foundation;
pub mod logo;
pub mod photo;
pub mod pipeline;
pub mod text;
pub mod wallpaper;

pub use artifacts::{ArtifactWriter, DOWNLOAD_FILE_NAME, WrittenArtifacts, download_bytes, encode_png};
pub use color::{ColorPair, Rgb8};
pub use config::ThumbnailConfig;
pub use foundation::core::{Canvas, Offset};
pub use foundation::error::{ThumbError, ThumbResult};
pub use logo::LogoSpec;
pub use photo::{BackgroundRemover, BorderKeyRemover, CommandRemover, PhotoOverlaySpec};
pub use pipeline::{Composite, Compositor};
pub use text::{BoundingBox, TextBlock, TitleFont};
pub use wallpaper::{BackgroundRenderer, GradientWallpaper, SolidWallpaper};
