use std::path::{Path, PathBuf};

use image::{RgbaImage, imageops::FilterType};

use crate::{
    composite::paste_over,
    foundation::{
        core::{MAX_PLACEMENT, Offset},
        error::{ThumbError, ThumbResult},
    },
};

pub const MAX_LOGO_WIDTH: u32 = 500;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogoSpec {
    pub enabled: bool,
    /// Target width in pixels; height follows the asset's aspect ratio.
    pub width: u32,
    pub position: Offset,
    pub path: PathBuf,
}

impl Default for LogoSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 180,
            position: Offset::new(20, 900),
            path: PathBuf::from("streamlit-logo.png"),
        }
    }
}

impl LogoSpec {
    pub fn validate(&self) -> ThumbResult<()> {
        if self.width > MAX_LOGO_WIDTH {
            return Err(ThumbError::validation(format!(
                "logo width {} exceeds {MAX_LOGO_WIDTH}",
                self.width
            )));
        }
        if !self.position.is_within(MAX_PLACEMENT) {
            return Err(ThumbError::validation(format!(
                "logo position ({}, {}) outside ±{MAX_PLACEMENT}",
                self.position.x, self.position.y
            )));
        }
        Ok(())
    }
}

/// Load the logo asset as RGBA so its alpha can act as the paste mask.
pub fn load_logo(path: &Path) -> ThumbResult<RgbaImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| ThumbError::asset(format!("read logo '{}': {e}", path.display())))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| ThumbError::asset(format!("decode logo '{}': {e}", path.display())))?;
    Ok(img.to_rgba8())
}

/// `round(height * target_width / width)`, never below one pixel.
pub fn proportional_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return height.max(1);
    }
    let h = (f64::from(height) * f64::from(target_width) / f64::from(width)).round();
    (h as u32).max(1)
}

pub fn resize_to_width(img: &RgbaImage, target_width: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let target_height = proportional_height(w, h, target_width);
    if (w, h) == (target_width, target_height) {
        return img.clone();
    }
    image::imageops::resize(img, target_width, target_height, FilterType::Lanczos3)
}

/// Resize and paste the logo. Returns `false` when the spec skips the logo.
pub fn apply_logo(canvas: &mut RgbaImage, spec: &LogoSpec, logo: &RgbaImage) -> bool {
    if !spec.enabled || spec.width == 0 || logo.width() == 0 || logo.height() == 0 {
        return false;
    }
    let scaled = resize_to_width(logo, spec.width);
    tracing::debug!(
        width = scaled.width(),
        height = scaled.height(),
        x = spec.position.x,
        y = spec.position.y,
        "pasting logo"
    );
    paste_over(canvas, &scaled, spec.position);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn proportional_height_rounds() {
        assert_eq!(proportional_height(400, 300, 180), 135);
        assert_eq!(proportional_height(3, 2, 2), 1); // 1.333 -> 1
        assert_eq!(proportional_height(3, 2, 4), 3); // 2.667 -> 3
        assert_eq!(proportional_height(1000, 1, 10), 1);
    }

    #[test]
    fn resize_preserves_aspect_ratio() {
        let logo = RgbaImage::from_pixel(400, 100, Rgba([255, 0, 0, 255]));
        let out = resize_to_width(&logo, 180);
        assert_eq!(out.dimensions(), (180, 45));
    }

    #[test]
    fn disabled_or_zero_width_logo_is_skipped() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let before = canvas.clone();
        let logo = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));

        let mut spec = LogoSpec {
            enabled: false,
            width: 4,
            position: Offset::new(0, 0),
            path: PathBuf::new(),
        };
        assert!(!apply_logo(&mut canvas, &spec, &logo));

        spec.enabled = true;
        spec.width = 0;
        assert!(!apply_logo(&mut canvas, &spec, &logo));
        assert_eq!(canvas, before);
    }

    #[test]
    fn logo_alpha_masks_paste() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255]));
        let mut logo = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        logo.put_pixel(0, 0, Rgba([255, 255, 255, 0]));

        let spec = LogoSpec {
            enabled: true,
            width: 2,
            position: Offset::new(3, 4),
            path: PathBuf::new(),
        };
        assert!(apply_logo(&mut canvas, &spec, &logo));
        assert_eq!(canvas.get_pixel(3, 4).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(4, 4).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(4, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn validate_rejects_oversized_width() {
        let spec = LogoSpec {
            width: 501,
            ..LogoSpec::default()
        };
        assert!(spec.validate().is_err());
        assert!(LogoSpec::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_far_off_position() {
        let spec = LogoSpec {
            position: Offset::new(0, i64::MIN),
            ..LogoSpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn load_logo_reports_missing_file_as_asset_error() {
        let err = load_logo(Path::new("no/such/logo.png")).unwrap_err();
        assert!(matches!(err, ThumbError::Asset(_)));
    }
}
