use std::path::Path;

use image::{Rgba, RgbaImage};
use thumbforge::{
    BoundingBox, Offset, TextBlock, TitleFont,
    text::{draw_text_block, text_extent},
};

fn system_font() -> Option<TitleFont> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ]
    .iter()
    .find_map(|p| TitleFont::from_path(Path::new(p)).ok())
}

#[test]
fn unboxed_text_only_touches_glyph_region() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font available");
        return;
    };

    let bg = Rgba([30, 60, 90, 255]);
    let mut img = RgbaImage::from_pixel(400, 200, bg);
    let block = TextBlock {
        text: "GITHUB".to_string(),
        font_size: 80,
        origin: Offset::new(20, 30),
        bounding_box: BoundingBox {
            enabled: false,
            top_left: Offset::new(0, 0),
            bottom_right: Offset::new(399, 199),
        },
    };
    draw_text_block(&mut img, &font, &block);

    let (x0, y0, x1, y1) = text_extent(&font, 80.0, block.origin, &block.text).unwrap();
    let mut changed_inside = 0;
    for (x, y, p) in img.enumerate_pixels() {
        let (x, y) = (x as i32, y as i32);
        let inside = x >= x0 && x < x1 && y >= y0 && y < y1;
        if inside {
            if *p != bg {
                changed_inside += 1;
            }
        } else {
            assert_eq!(*p, bg, "pixel ({x},{y}) outside glyphs changed");
        }
    }
    assert!(changed_inside > 0);
}

#[test]
fn text_past_canvas_edge_is_clipped() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font available");
        return;
    };

    let mut img = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
    let block = TextBlock {
        text: "WIDE TEXT".to_string(),
        font_size: 120,
        origin: Offset::new(-30, -40),
        bounding_box: BoundingBox::new(Offset::new(-100, -100), Offset::new(10, 10)),
    };
    draw_text_block(&mut img, &font, &block);
    assert_eq!(img.dimensions(), (50, 50));
}

#[test]
fn empty_text_has_no_extent() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font available");
        return;
    };
    assert!(text_extent(&font, 50.0, Offset::new(0, 0), "").is_none());
}

#[test]
fn font_size_is_the_em_size() {
    // DejaVu Sans Bold: capHeight 1493 of 2048 units per em, so "H" at 100 px is ~73 px tall.
    let path = Path::new("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf");
    let Ok(font) = TitleFont::from_path(path) else {
        eprintln!("skipping: {} not available", path.display());
        return;
    };

    let (_, y0, _, y1) = text_extent(&font, 100.0, Offset::new(0, 0), "H").unwrap();
    let height = y1 - y0;
    assert!((71..=75).contains(&height), "cap height {height}px at 100px em");
}
