/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Full-HD YouTube thumbnail canvas.
    pub const THUMBNAIL: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Largest accepted width or height.
    pub const MAX_SIDE: u32 = 8192;
}

/// Largest accepted distance of a placement from the canvas origin, per axis.
pub const MAX_PLACEMENT: i64 = 1_000_000;

/// Signed placement on the canvas. Negative or oversized values are legal and clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

impl Offset {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn is_within(self, limit: i64) -> bool {
        (-limit..=limit).contains(&self.x) && (-limit..=limit).contains(&self.y)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
pub type PremulRgba8 = [u8; 4];

/// Convert straight-alpha RGBA8 into premultiplied RGBA8.
pub fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let premul = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
    [premul(px[0]), premul(px[1]), premul(px[2]), px[3]]
}

/// Inverse of [`premultiply`]; fully transparent pixels become transparent black.
pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let straight = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [straight(px[0]), straight(px[1]), straight(px[2]), px[3]]
}
