use crate::layout::CloudLayout;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use verdict_core::CoreError;

const FONT_FAMILY: &str = "verdict-cloud";

/// Searched in order when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Turns a finished layout into an image file.
pub trait CloudRenderer {
    fn render(&mut self, layout: &CloudLayout, path: &Path) -> Result<(), CoreError>;
}

fn render_error<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Render {
        message: e.to_string(),
    }
}

/// PNG output through plotters' bitmap backend, black background.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    font_path: PathBuf,
}

impl PngRenderer {
    /// Loads and registers the TrueType font at `font_path`, or the first
    /// system font found.
    pub fn new(font_path: Option<&Path>) -> Result<Self, CoreError> {
        let font_path = match font_path {
            Some(path) => path.to_path_buf(),
            None => SYSTEM_FONTS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
                .ok_or_else(|| CoreError::Render {
                    message: "no system font found; set wordcloud.font_path".to_string(),
                })?,
        };

        let bytes = std::fs::read(&font_path)?;
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| CoreError::Render {
            message: format!("{} is not a usable TrueType font", font_path.display()),
        })?;
        debug!("Registered font {}", font_path.display());

        Ok(Self { font_path })
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }
}

impl CloudRenderer for PngRenderer {
    fn render(&mut self, layout: &CloudLayout, path: &Path) -> Result<(), CoreError> {
        let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
        root.fill(&BLACK).map_err(render_error)?;

        for word in &layout.words {
            let (r, g, b) = word.color;
            let mut font = FontDesc::new(
                FontFamily::Name(FONT_FAMILY),
                word.font_size as f64,
                FontStyle::Normal,
            );
            let (x, y) = (word.x as i32, word.y as i32);
            let anchor_y = if word.vertical {
                // rotated text grows upward from its anchor
                font = font.transform(FontTransform::Rotate270);
                y + word.box_size().1 as i32
            } else {
                y
            };
            let style = font.color(&RGBColor(r, g, b));
            root.draw_text(&word.text, &style, (x, anchor_y))
                .map_err(render_error)?;
        }

        root.present().map_err(render_error)?;
        info!("Rendered {} words to {}", layout.words.len(), path.display());
        Ok(())
    }
}
