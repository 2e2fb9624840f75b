use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    color::ColorPair,
    foundation::{
        core::{Canvas, Offset},
        error::{ThumbError, ThumbResult},
    },
    logo::LogoSpec,
    photo::PhotoOverlaySpec,
    text::{BoundingBox, TextBlock},
};

/// Everything one render pass needs, apart from the photo itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Always [`Canvas::THUMBNAIL`] when loaded from JSON.
    #[serde(skip, default = "thumbnail_canvas")]
    pub canvas: Canvas,
    pub colors: ColorPair,
    /// Title lines, drawn in order; later lines paint over earlier ones.
    pub lines: [TextBlock; 2],
    pub font_path: PathBuf,
    pub logo: LogoSpec,
    pub photo: PhotoOverlaySpec,
}

fn thumbnail_canvas() -> Canvas {
    Canvas::THUMBNAIL
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::THUMBNAIL,
            colors: ColorPair::default(),
            lines: [
                TextBlock {
                    text: "GITHUB".to_string(),
                    font_size: 150,
                    origin: Offset::new(85, 340),
                    bounding_box: BoundingBox::new(Offset::new(50, 340), Offset::new(750, 520)),
                },
                TextBlock {
                    text: "SRIKANTH".to_string(),
                    font_size: 120,
                    origin: Offset::new(85, 550),
                    bounding_box: BoundingBox::new(Offset::new(50, 540), Offset::new(1010, 700)),
                },
            ],
            font_path: PathBuf::from("font/Montserrat-BlackItalic.ttf"),
            logo: LogoSpec::default(),
            photo: PhotoOverlaySpec::default(),
        }
    }
}

impl ThumbnailConfig {
    pub fn from_path(path: &Path) -> ThumbResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let r = BufReader::new(f);
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ThumbError::serde(format!("parse config '{}': {e}", path.display())))?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> ThumbResult<Self> {
        serde_json::from_str(s).map_err(|e| ThumbError::serde(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> ThumbResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ThumbError::serde(e.to_string()))
    }

    pub fn validate(&self) -> ThumbResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ThumbError::validation("canvas width/height must be > 0"));
        }
        if self.canvas.width > Canvas::MAX_SIDE || self.canvas.height > Canvas::MAX_SIDE {
            return Err(ThumbError::validation(format!(
                "canvas {}x{} exceeds {} on a side",
                self.canvas.width,
                self.canvas.height,
                Canvas::MAX_SIDE
            )));
        }
        for (i, line) in self.lines.iter().enumerate() {
            line.validate().map_err(|e| match e {
                ThumbError::Validation(msg) => {
                    ThumbError::validation(format!("line {}: {msg}", i + 1))
                }
                other => other,
            })?;
        }
        self.logo.validate()?;
        self.photo.validate()?;
        Ok(())
    }
}
