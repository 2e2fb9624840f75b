use std::path::Path;

use image::RgbaImage;
use rusttype::{Font, Scale, point};

use crate::{
    color::Rgb8,
    composite::{blend_straight, fill_rect},
    foundation::{
        core::{MAX_PLACEMENT, Offset},
        error::{ThumbError, ThumbResult},
    },
};

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 200;

/// Title text is always white; boxes behind it are always black.
pub const TEXT_COLOR: Rgb8 = Rgb8::WHITE;
pub const BOX_COLOR: Rgb8 = Rgb8::BLACK;

/// A parsed TrueType/OpenType face used for both title lines.
#[derive(Clone)]
pub struct TitleFont {
    font: Font<'static>,
}

impl std::fmt::Debug for TitleFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl TitleFont {
    pub fn from_bytes(bytes: Vec<u8>) -> ThumbResult<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| ThumbError::asset("font bytes are not a valid TrueType/OpenType face"))?;
        Ok(Self { font })
    }

    /// rusttype scale for an em size of `px` pixels.
    ///
    /// `Scale::uniform` sizes the ascent-to-descent span, not the em square.
    fn em_scale(&self, px: f32) -> Scale {
        let vm = self.font.v_metrics_unscaled();
        let units_per_em = f32::from(self.font.units_per_em().max(1));
        let span = vm.ascent - vm.descent;
        if span <= 0.0 {
            return Scale::uniform(px);
        }
        Scale::uniform(px * span / units_per_em)
    }

    pub fn from_path(path: &Path) -> ThumbResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| ThumbError::asset(format!("read font '{}': {e}", path.display())))?;
        Self::from_bytes(bytes).map_err(|e| match e {
            ThumbError::Asset(msg) => ThumbError::asset(format!("{}: {msg}", path.display())),
            other => other,
        })
    }
}

/// Inclusive corners of the opaque rectangle drawn behind a title line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub enabled: bool,
    pub top_left: Offset,
    pub bottom_right: Offset,
}

impl BoundingBox {
    pub fn new(top_left: Offset, bottom_right: Offset) -> Self {
        Self {
            enabled: true,
            top_left,
            bottom_right,
        }
    }
}

/// One title line.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextBlock {
    pub text: String,
    /// Em size in pixels, `10..=200`.
    pub font_size: u32,
    /// Top-left of the line box; the baseline sits one ascent below it.
    pub origin: Offset,
    pub bounding_box: BoundingBox,
}

impl TextBlock {
    pub fn validate(&self) -> ThumbResult<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(ThumbError::validation(format!(
                "font size {} outside {MIN_FONT_SIZE}..={MAX_FONT_SIZE}",
                self.font_size
            )));
        }
        if !self.origin.is_within(MAX_PLACEMENT) {
            return Err(ThumbError::validation(format!(
                "text origin ({}, {}) outside ±{MAX_PLACEMENT}",
                self.origin.x, self.origin.y
            )));
        }
        let b = &self.bounding_box;
        let corners_in_range =
            b.top_left.is_within(MAX_PLACEMENT) && b.bottom_right.is_within(MAX_PLACEMENT);
        if b.enabled && !corners_in_range {
            return Err(ThumbError::validation(format!(
                "bounding box corners outside ±{MAX_PLACEMENT}"
            )));
        }
        if b.enabled && (b.top_left.x > b.bottom_right.x || b.top_left.y > b.bottom_right.y) {
            return Err(ThumbError::validation(format!(
                "bounding box corners out of order: ({}, {}) -> ({}, {})",
                b.top_left.x, b.top_left.y, b.bottom_right.x, b.bottom_right.y
            )));
        }
        Ok(())
    }
}

/// Draw the block's box (if enabled) and then its text.
pub fn draw_text_block(canvas: &mut RgbaImage, font: &TitleFont, block: &TextBlock) {
    draw_box(canvas, &block.bounding_box);
    draw_text(
        canvas,
        font,
        block.font_size as f32,
        block.origin,
        TEXT_COLOR,
        &block.text,
    );
}

pub fn draw_box(canvas: &mut RgbaImage, bbox: &BoundingBox) {
    if !bbox.enabled {
        return;
    }
    fill_rect(
        canvas,
        bbox.top_left.x,
        bbox.top_left.y,
        bbox.bottom_right.x,
        bbox.bottom_right.y,
        BOX_COLOR.to_rgba(),
    );
}

/// Rasterize `text` with glyph coverage blended over the canvas. Pixels outside
/// glyph coverage are left untouched.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &TitleFont,
    px: f32,
    origin: Offset,
    color: Rgb8,
    text: &str,
) {
    let scale = font.em_scale(px);
    let v_metrics = font.font.v_metrics(scale);
    let start = point(origin.x as f32, origin.y as f32 + v_metrics.ascent);
    let (w, h) = canvas.dimensions();

    for glyph in font.font.layout(text, scale, start) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            let x = i64::from(bb.min.x) + i64::from(gx);
            let y = i64::from(bb.min.y) + i64::from(gy);
            if x < 0 || y < 0 || x >= i64::from(w) || y >= i64::from(h) {
                return;
            }
            let a = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            if a == 0 {
                return;
            }
            let dst = canvas.get_pixel_mut(x as u32, y as u32);
            dst.0 = blend_straight(dst.0, [color.r, color.g, color.b, a]);
        });
    }
}

/// Union of glyph pixel bounds as `(min_x, min_y, max_x, max_y)`, max exclusive.
pub fn text_extent(
    font: &TitleFont,
    px: f32,
    origin: Offset,
    text: &str,
) -> Option<(i32, i32, i32, i32)> {
    let scale = font.em_scale(px);
    let v_metrics = font.font.v_metrics(scale);
    let start = point(origin.x as f32, origin.y as f32 + v_metrics.ascent);

    font.font
        .layout(text, scale, start)
        .filter_map(|g| g.pixel_bounding_box())
        .fold(None, |acc, bb| match acc {
            None => Some((bb.min.x, bb.min.y, bb.max.x, bb.max.y)),
            Some((x0, y0, x1, y1)) => Some((
                x0.min(bb.min.x),
                y0.min(bb.min.y),
                x1.max(bb.max.x),
                y1.max(bb.max.y),
            )),
        })
}
