use image::RgbaImage;

use crate::foundation::core::{Offset, PremulRgba8, premultiply, unpremultiply};

/// Source-over on premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(src[i], dc);
    }
    out
}

/// Blend a straight-alpha pixel onto a straight-alpha pixel.
pub fn blend_straight(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => dst,
        255 => src,
        _ => unpremultiply(over(premultiply(dst), premultiply(src))),
    }
}

/// Paste `src` onto `dst` with its top-left corner at `at`, using the source
/// alpha as the mask. Parts that fall outside `dst` are clipped.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, at: Offset) {
    let Some(region) = clip_region(dst.dimensions(), src.dimensions(), at) else {
        return;
    };

    for sy in region.src_y0..region.src_y1 {
        let dy = (i64::from(sy) + at.y) as u32;
        for sx in region.src_x0..region.src_x1 {
            let dx = (i64::from(sx) + at.x) as u32;
            let s = src.get_pixel(sx, sy).0;
            if s[3] == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(dx, dy);
            d.0 = blend_straight(d.0, s);
        }
    }
}

/// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)` with an opaque color, clipped to `dst`.
pub fn fill_rect(dst: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, color: image::Rgba<u8>) {
    let (w, h) = dst.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let cx0 = x0.max(0);
    let cy0 = y0.max(0);
    let cx1 = x1.min(i64::from(w) - 1);
    let cy1 = y1.min(i64::from(h) - 1);
    if cx0 > cx1 || cy0 > cy1 {
        return;
    }
    for y in cy0..=cy1 {
        for x in cx0..=cx1 {
            dst.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClipRegion {
    src_x0: u32,
    src_y0: u32,
    src_x1: u32, // exclusive
    src_y1: u32, // exclusive
}

fn clip_region(dst: (u32, u32), src: (u32, u32), at: Offset) -> Option<ClipRegion> {
    let axis = |dst_len: u32, src_len: u32, pos: i64| -> Option<(u32, u32)> {
        let start = pos.saturating_neg().max(0);
        let end = i64::from(dst_len)
            .saturating_sub(pos)
            .min(i64::from(src_len));
        if start >= end {
            return None;
        }
        Some((start as u32, end as u32))
    };

    let (src_x0, src_x1) = axis(dst.0, src.0, at.x)?;
    let (src_y0, src_y1) = axis(dst.1, src.1, at.y)?;
    Some(ClipRegion {
        src_x0,
        src_y0,
        src_x1,
        src_y1,
    })
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn blend_half_alpha_onto_opaque_stays_opaque() {
        let out = blend_straight([0, 0, 0, 255], [255, 255, 255, 128]);
        assert_eq!(out[3], 255);
        assert!(out[0] > 120 && out[0] < 135);
    }

    #[test]
    fn paste_respects_mask_and_offset() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let mut src = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 1, Rgba([0, 255, 0, 0]));

        paste_over(&mut dst, &src, Offset::new(1, 1));

        assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(dst.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(dst.get_pixel(2, 1).0, [255, 0, 0, 255]);
        assert_eq!(dst.get_pixel(1, 2).0, [255, 0, 0, 255]);
        // transparent source pixel keeps the background
        assert_eq!(dst.get_pixel(2, 2).0, [0, 0, 255, 255]);
    }

    #[test]
    fn paste_with_negative_offset_clips() {
        let mut dst = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));

        paste_over(&mut dst, &src, Offset::new(-2, -2));

        assert_eq!(dst.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(dst.get_pixel(1, 0).0, [0, 0, 0, 255]);
        assert_eq!(dst.get_pixel(0, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn paste_entirely_off_canvas_is_noop() {
        let mut dst = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
        let before = dst.clone();
        let src = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));

        paste_over(&mut dst, &src, Offset::new(3, 0));
        paste_over(&mut dst, &src, Offset::new(-2, 0));
        paste_over(&mut dst, &src, Offset::new(0, 1000));
        assert_eq!(dst, before);
    }

    #[test]
    fn paste_translucent_onto_translucent_blends_both_alphas() {
        let mut dst = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 255, 128]));
        let src = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 128]));

        paste_over(&mut dst, &src, Offset::new(1, 0));

        assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 255, 128]);
        // a = 128 + 128 * (1 - 128/255); color weighted by each layer's coverage
        assert_eq!(dst.get_pixel(1, 0).0, [170, 0, 85, 192]);
    }

    #[test]
    fn paste_at_extreme_offsets_is_noop() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let before = dst.clone();
        let src = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));

        for at in [
            Offset::new(i64::MIN, 0),
            Offset::new(0, i64::MIN),
            Offset::new(i64::MAX, 0),
            Offset::new(0, i64::MAX),
            Offset::new(i64::MIN, i64::MAX),
        ] {
            paste_over(&mut dst, &src, at);
        }
        assert_eq!(dst, before);
    }

    #[test]
    fn fill_rect_with_extreme_corners_clips() {
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        fill_rect(&mut img, i64::MIN, i64::MIN, i64::MAX, i64::MAX, Rgba([0, 0, 0, 255]));
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn fill_rect_is_inclusive() {
        let mut img = RgbaImage::from_pixel(5, 5, Rgba([255, 255, 255, 255]));
        fill_rect(&mut img, 1, 1, 2, 3, Rgba([0, 0, 0, 255]));

        let filled = img.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        assert_eq!(filled, 2 * 3);
        assert_eq!(img.get_pixel(2, 3).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        fill_rect(&mut img, -10, 2, 100, 100, Rgba([0, 0, 0, 255]));
        let filled = img.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        assert_eq!(filled, 4 * 2);
    }

    #[test]
    fn fill_rect_fully_outside_is_noop() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let before = img.clone();
        fill_rect(&mut img, 10, 10, 20, 20, Rgba([0, 0, 0, 255]));
        fill_rect(&mut img, 2, 2, 1, 1, Rgba([0, 0, 0, 255]));
        assert_eq!(img, before);
    }
}
