use image::RgbaImage;

use crate::{
    color::ColorPair,
    foundation::{
        core::Canvas,
        error::{ThumbError, ThumbResult},
    },
};

/// Renders the two-color background canvas.
pub trait BackgroundRenderer {
    fn render(&self, colors: ColorPair, canvas: Canvas) -> ThumbResult<RgbaImage>;
}

/// Diagonal linear blend: `first` at the top-left corner, `second` at the bottom-right.
#[derive(Clone, Copy, Debug, Default)]
pub struct GradientWallpaper;

impl BackgroundRenderer for GradientWallpaper {
    fn render(&self, colors: ColorPair, canvas: Canvas) -> ThumbResult<RgbaImage> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ThumbError::validation(
                "wallpaper canvas width/height must be > 0",
            ));
        }

        let span_x = f64::from(canvas.width.saturating_sub(1).max(1));
        let span_y = f64::from(canvas.height.saturating_sub(1).max(1));
        let a = colors.first;
        let b = colors.second;

        let img = RgbaImage::from_fn(canvas.width, canvas.height, |x, y| {
            let t = (f64::from(x) / span_x + f64::from(y) / span_y) * 0.5;
            image::Rgba([lerp(a.r, b.r, t), lerp(a.g, b.g, t), lerp(a.b, b.b, t), 255])
        });
        Ok(img)
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    let t = t.clamp(0.0, 1.0);
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

/// Fill-only renderer; handy when the wallpaper should be a single color.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolidWallpaper;

impl BackgroundRenderer for SolidWallpaper {
    fn render(&self, colors: ColorPair, canvas: Canvas) -> ThumbResult<RgbaImage> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ThumbError::validation(
                "wallpaper canvas width/height must be > 0",
            ));
        }
        Ok(RgbaImage::from_pixel(
            canvas.width,
            canvas.height,
            colors.first.to_rgba(),
        ))
    }
}
