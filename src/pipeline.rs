use std::borrow::Cow;

use image::{DynamicImage, RgbaImage};

use crate::{
    composite::paste_over,
    config::ThumbnailConfig,
    foundation::error::{ThumbError, ThumbResult},
    logo::{apply_logo, load_logo},
    photo::{BackgroundRemover, BorderKeyRemover, prepare_photo},
    text::{TitleFont, draw_text_block},
    wallpaper::{BackgroundRenderer, GradientWallpaper},
};

/// In-memory output of every stage of one render pass.
#[derive(Clone, Debug)]
pub struct Composite {
    pub wallpaper: RgbaImage,
    /// Wallpaper plus title lines and logo.
    pub thumbnail: RgbaImage,
    /// Background-removed, resized photo (only when a photo was given).
    pub photo: Option<RgbaImage>,
    /// Thumbnail with the photo pasted on top (only when a photo was given).
    pub final_image: Option<RgbaImage>,
}

impl Composite {
    /// The image offered for download: the final image if there is one, else the thumbnail.
    pub fn output(&self) -> &RgbaImage {
        self.final_image.as_ref().unwrap_or(&self.thumbnail)
    }
}

/// Runs the wallpaper → text → logo → photo pipeline.
pub struct Compositor {
    background: Box<dyn BackgroundRenderer>,
    remover: Box<dyn BackgroundRemover>,
    font: TitleFont,
    logo: Option<RgbaImage>,
}

impl Compositor {
    pub fn new(font: TitleFont) -> Self {
        Self {
            background: Box::new(GradientWallpaper),
            remover: Box::new(BorderKeyRemover::default()),
            font,
            logo: None,
        }
    }

    /// Load the font named by `cfg.font_path`.
    pub fn from_config(cfg: &ThumbnailConfig) -> ThumbResult<Self> {
        let font = TitleFont::from_path(&cfg.font_path)?;
        Ok(Self::new(font))
    }

    pub fn with_background(mut self, background: Box<dyn BackgroundRenderer>) -> Self {
        self.background = background;
        self
    }

    pub fn with_remover(mut self, remover: Box<dyn BackgroundRemover>) -> Self {
        self.remover = remover;
        self
    }

    /// Use an already decoded logo instead of reading `LogoSpec::path`.
    pub fn with_logo_image(mut self, logo: RgbaImage) -> Self {
        self.logo = Some(logo);
        self
    }

    #[tracing::instrument(skip_all, fields(has_photo = photo.is_some()))]
    pub fn compose(
        &self,
        cfg: &ThumbnailConfig,
        photo: Option<&DynamicImage>,
    ) -> ThumbResult<Composite> {
        cfg.validate()?;

        let wallpaper = self.render_wallpaper(cfg)?;
        let thumbnail = self.render_thumbnail(cfg, &wallpaper)?;

        let (photo, final_image) = match photo {
            Some(photo) => {
                let prepared =
                    prepare_photo(photo, self.remover.as_ref(), cfg.photo.target_height)?;
                let mut final_image = thumbnail.clone();
                paste_over(&mut final_image, &prepared, cfg.photo.position);
                tracing::debug!(
                    x = cfg.photo.position.x,
                    y = cfg.photo.position.y,
                    "photo composited"
                );
                (Some(prepared), Some(final_image))
            }
            None => {
                tracing::debug!("no photo; skipping background removal");
                (None, None)
            }
        };

        Ok(Composite {
            wallpaper,
            thumbnail,
            photo,
            final_image,
        })
    }

    fn render_wallpaper(&self, cfg: &ThumbnailConfig) -> ThumbResult<RgbaImage> {
        let wallpaper = self.background.render(cfg.colors, cfg.canvas)?;
        if wallpaper.dimensions() != (cfg.canvas.width, cfg.canvas.height) {
            return Err(ThumbError::validation(format!(
                "background renderer produced {}x{}, expected {}x{}",
                wallpaper.width(),
                wallpaper.height(),
                cfg.canvas.width,
                cfg.canvas.height
            )));
        }
        tracing::debug!(
            first = %cfg.colors.first,
            second = %cfg.colors.second,
            "wallpaper rendered"
        );
        Ok(wallpaper)
    }

    fn render_thumbnail(
        &self,
        cfg: &ThumbnailConfig,
        wallpaper: &RgbaImage,
    ) -> ThumbResult<RgbaImage> {
        let mut thumbnail = wallpaper.clone();
        for line in &cfg.lines {
            draw_text_block(&mut thumbnail, &self.font, line);
        }

        if cfg.logo.enabled && cfg.logo.width > 0 {
            let logo = match &self.logo {
                Some(logo) => Cow::Borrowed(logo),
                None => Cow::Owned(load_logo(&cfg.logo.path)?),
            };
            apply_logo(&mut thumbnail, &cfg.logo, &logo);
        } else {
            tracing::debug!("logo disabled");
        }
        Ok(thumbnail)
    }
}
