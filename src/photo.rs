use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context as _;
use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::foundation::{
    core::{MAX_PLACEMENT, Offset},
    error::{ThumbError, ThumbResult},
};

/// Height every prepared photo is scaled to.
pub const PHOTO_TARGET_HEIGHT: u32 = 1080;

/// Turns a photo into an RGBA image whose background is transparent.
pub trait BackgroundRemover {
    fn remove_background(&self, image: &DynamicImage) -> ThumbResult<RgbaImage>;
}

impl<F> BackgroundRemover for F
where
    F: Fn(&DynamicImage) -> ThumbResult<RgbaImage>,
{
    fn remove_background(&self, image: &DynamicImage) -> ThumbResult<RgbaImage> {
        self(image)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PhotoOverlaySpec {
    /// Top-left of the prepared photo on the canvas; may be negative.
    pub position: Offset,
    pub target_height: u32,
}

impl Default for PhotoOverlaySpec {
    fn default() -> Self {
        Self {
            position: Offset::new(0, 0),
            target_height: PHOTO_TARGET_HEIGHT,
        }
    }
}

impl PhotoOverlaySpec {
    pub fn validate(&self) -> ThumbResult<()> {
        if self.target_height == 0 {
            return Err(ThumbError::validation("photo target height must be > 0"));
        }
        if !self.position.is_within(MAX_PLACEMENT) {
            return Err(ThumbError::validation(format!(
                "photo position ({}, {}) outside ±{MAX_PLACEMENT}",
                self.position.x, self.position.y
            )));
        }
        Ok(())
    }
}

/// Remove the background and scale the result to `target_height`, keeping aspect ratio.
pub fn prepare_photo(
    photo: &DynamicImage,
    remover: &dyn BackgroundRemover,
    target_height: u32,
) -> ThumbResult<RgbaImage> {
    if photo.width() == 0 || photo.height() == 0 {
        return Err(ThumbError::asset("photo has zero width or height"));
    }
    let cutout = remover.remove_background(photo)?;
    let (w, h) = cutout.dimensions();
    if w == 0 || h == 0 {
        return Err(ThumbError::removal(
            "background remover returned an empty image",
        ));
    }

    let target_width = proportional_width(w, h, target_height);
    tracing::debug!(
        from_w = w,
        from_h = h,
        to_w = target_width,
        to_h = target_height,
        "scaling photo cutout"
    );
    if (w, h) == (target_width, target_height) {
        return Ok(cutout);
    }
    Ok(image::imageops::resize(
        &cutout,
        target_width,
        target_height,
        FilterType::Lanczos3,
    ))
}

/// `round(width * target_height / height)`, never below one pixel.
pub fn proportional_width(width: u32, height: u32, target_height: u32) -> u32 {
    let w = (f64::from(width) * f64::from(target_height) / f64::from(height.max(1))).round();
    (w as u32).max(1)
}

/// Keys out the region connected to the image border whose color is close to
/// the average corner color.
#[derive(Clone, Copy, Debug)]
pub struct BorderKeyRemover {
    /// Maximum per-channel distance from the key color.
    pub tolerance: u8,
}

impl Default for BorderKeyRemover {
    fn default() -> Self {
        Self { tolerance: 32 }
    }
}

impl BorderKeyRemover {
    fn key_color(img: &RgbaImage) -> [u8; 3] {
        let (w, h) = img.dimensions();
        let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
        let mut sum = [0u32; 3];
        for (x, y) in corners {
            let p = img.get_pixel(x, y).0;
            for i in 0..3 {
                sum[i] += u32::from(p[i]);
            }
        }
        [
            (sum[0] / 4) as u8,
            (sum[1] / 4) as u8,
            (sum[2] / 4) as u8,
        ]
    }

    fn matches(&self, px: [u8; 4], key: [u8; 3]) -> bool {
        px[3] == 0 || (0..3).all(|i| px[i].abs_diff(key[i]) <= self.tolerance)
    }
}

impl BackgroundRemover for BorderKeyRemover {
    fn remove_background(&self, image: &DynamicImage) -> ThumbResult<RgbaImage> {
        let mut img = image.to_rgba8();
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(ThumbError::removal("cannot key an empty image"));
        }

        let key = Self::key_color(&img);
        let idx = |x: u32, y: u32| (y as usize) * (w as usize) + (x as usize);
        let mut visited = vec![false; (w as usize) * (h as usize)];
        let mut queue = VecDeque::new();

        let border = (0..w)
            .flat_map(|x| [(x, 0), (x, h - 1)])
            .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));
        for (x, y) in border {
            if !visited[idx(x, y)] && self.matches(img.get_pixel(x, y).0, key) {
                visited[idx(x, y)] = true;
                queue.push_back((x, y));
            }
        }

        let mut cleared = 0usize;
        while let Some((x, y)) = queue.pop_front() {
            img.get_pixel_mut(x, y).0 = [0, 0, 0, 0];
            cleared += 1;

            let neighbors = [
                (x.checked_sub(1), Some(y)),
                (x.checked_add(1).filter(|&nx| nx < w), Some(y)),
                (Some(x), y.checked_sub(1)),
                (Some(x), y.checked_add(1).filter(|&ny| ny < h)),
            ];
            for (nx, ny) in neighbors {
                let (Some(nx), Some(ny)) = (nx, ny) else {
                    continue;
                };
                if visited[idx(nx, ny)] {
                    continue;
                }
                if self.matches(img.get_pixel(nx, ny).0, key) {
                    visited[idx(nx, ny)] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        tracing::debug!(cleared, total = visited.len(), "border key removal");
        Ok(img)
    }
}

/// Delegates to an external segmentation tool through temporary PNG files.
///
/// `{input}` and `{output}` in `args` are replaced by the temp file paths.
/// The default runs `rembg i {input} {output}`.
#[derive(Clone, Debug)]
pub struct CommandRemover {
    pub program: String,
    pub args: Vec<String>,
    pub scratch_dir: PathBuf,
}

impl Default for CommandRemover {
    fn default() -> Self {
        Self {
            program: "rembg".to_string(),
            args: vec!["i".into(), "{input}".into(), "{output}".into()],
            scratch_dir: std::env::temp_dir(),
        }
    }
}

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

impl CommandRemover {
    fn scratch_path(&self, tag: &str) -> PathBuf {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        self.scratch_dir
            .join(format!("thumbforge-{}-{seq}-{tag}.png", std::process::id()))
    }

    fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

impl BackgroundRemover for CommandRemover {
    fn remove_background(&self, image: &DynamicImage) -> ThumbResult<RgbaImage> {
        let input = ScratchFile(self.scratch_path("in"));
        let output = ScratchFile(self.scratch_path("out"));

        image
            .save_with_format(&input.0, image::ImageFormat::Png)
            .with_context(|| format!("write scratch photo '{}'", input.0.display()))?;

        let args = self.expand_args(&input.0, &output.0);
        tracing::debug!(program = %self.program, ?args, "running background remover");

        let out = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ThumbError::removal(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.program
                ))
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ThumbError::removal(format!(
                "'{}' exited with status {}: {}",
                self.program,
                out.status,
                stderr.trim()
            )));
        }

        let cutout = image::open(&output.0).map_err(|e| {
            ThumbError::removal(format!(
                "read remover output '{}': {e}",
                output.0.display()
            ))
        })?;
        Ok(cutout.to_rgba8())
    }
}
